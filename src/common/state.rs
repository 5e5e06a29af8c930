// Application state shared across all modules

use sqlx::SqlitePool;

use crate::auth::sessions::SessionService;

/// Application state containing the database pool and auth configuration
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub jwt_secret: String,
    pub token_ttl_hours: Option<i64>,
}

impl AppState {
    /// Session issuer/verifier bound to this state's store and secret
    pub fn sessions(&self) -> SessionService {
        SessionService::new(
            self.db.clone(),
            self.jwt_secret.clone(),
            self.token_ttl_hours,
        )
    }
}
