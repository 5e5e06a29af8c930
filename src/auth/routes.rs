//! Authentication routes

use axum::{
    routing::{delete, get, post},
    Router,
};

use super::handlers;

/// Creates and returns the authentication router
///
/// # Routes
/// - `POST /users` - Sign up
/// - `POST /users/login` - Log in
/// - `GET /users/me` - Current user
/// - `DELETE /users/me/token` - Log out (revoke the presented token)
pub fn auth_routes() -> Router {
    Router::new()
        .route("/users", post(handlers::create_user))
        .route("/users/login", post(handlers::login))
        .route("/users/me", get(handlers::me_handler))
        .route("/users/me/token", delete(handlers::logout_handler))
}
