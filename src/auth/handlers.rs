//! Authentication handlers

use axum::{
    extract::{rejection::JsonRejection, Extension, Json},
    http::{HeaderMap, HeaderName, HeaderValue},
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use super::extractors::AuthedUser;
use super::models::{CreateUserRequest, LoginRequest, UserResponse, AUTH_HEADER};
use super::services::UsersService;
use crate::common::{safe_email_log, ApiError, AppState};

/// POST /users
/// Registers a user and starts a session
///
/// # Request Body
/// ```json
/// { "email": "a@b.com", "password": "at-least-8" }
/// ```
///
/// # Response
/// `x-auth: <token>` header and `{ "id": "U_...", "email": "a@b.com" }`
pub async fn create_user(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    body: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(HeaderMap, Json<UserResponse>), ApiError> {
    let Json(payload) = body?;
    let state = state_lock.read().await.clone();

    let mut user = UsersService::new(state.db.clone())
        .create_user(payload)
        .await?;
    let token = state.sessions().issue_token(&mut user).await?;

    info!(
        user_id = %user.id,
        email = %safe_email_log(&user.email),
        "User signed up"
    );

    Ok((auth_headers(&token)?, Json(UserResponse::from(&user))))
}

/// POST /users/login
/// Exchanges email and password for a new session token
pub async fn login(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(HeaderMap, Json<UserResponse>), ApiError> {
    let Json(payload) = body?;
    let state = state_lock.read().await.clone();

    let mut user = UsersService::new(state.db.clone())
        .find_by_credentials(&payload)
        .await?;
    let token = state.sessions().issue_token(&mut user).await?;

    info!(
        user_id = %user.id,
        email = %safe_email_log(&user.email),
        "User logged in"
    );

    Ok((auth_headers(&token)?, Json(UserResponse::from(&user))))
}

/// GET /users/me
/// Returns the user owning the presented token
pub async fn me_handler(authed: AuthedUser) -> Json<UserResponse> {
    Json(UserResponse::from(&authed.user))
}

/// DELETE /users/me/token
/// Revokes the presented token by removing it from the user's token list
///
/// # Response
/// ```json
/// { "message": "Logout successful" }
/// ```
pub async fn logout_handler(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let sessions = state_lock.read().await.sessions();

    sessions
        .remove_token(&authed.user.id, &authed.token)
        .await?;

    info!(user_id = %authed.user.id, "User logout successful");
    Ok(Json(serde_json::json!({
        "message": "Logout successful"
    })))
}

fn auth_headers(token: &str) -> Result<HeaderMap, ApiError> {
    let value = HeaderValue::from_str(token)
        .map_err(|_| ApiError::InternalServer("token is not a valid header value".to_string()))?;

    let mut headers = HeaderMap::new();
    headers.insert(HeaderName::from_static(AUTH_HEADER), value);
    Ok(headers)
}
