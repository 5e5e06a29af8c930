//! Authentication extractors for Axum

use async_trait::async_trait;
use axum::{
    extract::{Extension, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::models::{User, AUTH_HEADER};
use crate::common::{safe_email_log, ApiError, AppState};

/// Authenticated user extractor
///
/// Resolves the presented session token to its owner. The token is kept so
/// handlers can revoke exactly the session that made the request.
#[derive(Debug)]
pub struct AuthedUser {
    pub user: User,
    pub token: String,
}

/// Reads the session token from `x-auth`, falling back to `Authorization: Bearer`
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers.get(AUTH_HEADER).and_then(|h| h.to_str().ok()) {
        let value = value.trim();
        if !value.is_empty() {
            return Some(value.to_string());
        }
    }

    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Extract the Extension containing the AppState
        let Extension(state_lock): Extension<Arc<RwLock<AppState>>> =
            Extension::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::InternalServer("missing app state".to_string()))?;

        let sessions = state_lock.read().await.sessions();

        let token = match token_from_headers(&parts.headers) {
            Some(t) => t,
            None => {
                warn!("Authentication failed: missing session token");
                return Err(ApiError::Unauthorized("missing auth".into()));
            }
        };

        match sessions.find_user_by_token(&token).await? {
            Some(user) => {
                debug!(
                    user_id = %user.id,
                    email = %safe_email_log(&user.email),
                    "User authentication successful via extractor"
                );
                Ok(AuthedUser { user, token })
            }
            None => {
                warn!("Authentication failed: invalid or revoked token");
                Err(ApiError::Unauthorized("invalid token".into()))
            }
        }
    }
}
