//! Session tokens
//!
//! A token is an HS256-signed claim set `{sub, access, jti, iat[, exp]}`. Issuing
//! one also appends `{access, token}` to the owner's token list, and a token
//! only authenticates while that entry exists. Deleting the entry revokes the
//! token even though its signature keeps verifying.
//!
//! Lookup policy: a token that fails signature or claim checks resolves to
//! `Ok(None)`, the same as a revoked one. Store failures are returned as
//! `Err(ApiError::DatabaseError)` so callers can tell them apart.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sqlx::SqlitePool;
use tracing::{debug, error, info, warn};

use super::models::{Claims, User, UserToken, AUTH_ACCESS};
use crate::common::{generate_raw_id, safe_token_log, ApiError};

/// Session issuer and verifier
#[derive(Clone)]
pub struct SessionService {
    db: SqlitePool,
    secret: String,
    ttl_hours: Option<i64>,
}

impl SessionService {
    pub fn new(db: SqlitePool, secret: String, ttl_hours: Option<i64>) -> Self {
        Self {
            db,
            secret,
            ttl_hours,
        }
    }

    /// Signs `{sub: user_id, access}` with the server secret
    pub fn sign(&self, user_id: &str, access: &str) -> Result<String, ApiError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            access: access.to_string(),
            jti: generate_raw_id(12),
            iat: now.timestamp() as usize,
            exp: self
                .ttl_hours
                .map(|hours| (now + Duration::hours(hours)).timestamp() as usize),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| {
            error!(error = %e, user_id = %user_id, "JWT encoding error");
            ApiError::InternalServer("jwt error".to_string())
        })
    }

    /// Checks the signature (and `exp`, when present) and returns the claims
    pub fn verify(&self, token: &str) -> Option<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        // `exp` is optional; it is still enforced whenever the token carries one
        validation.required_spec_claims.clear();

        match decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        ) {
            Ok(data) => Some(data.claims),
            Err(e) => {
                debug!(error = %e, token = %safe_token_log(token), "JWT token validation failed");
                None
            }
        }
    }

    /// Signs a new `auth` token for `user` and appends it to the stored token list
    ///
    /// The token is persisted before it is returned; `user.tokens` is updated
    /// to match.
    pub async fn issue_token(&self, user: &mut User) -> Result<String, ApiError> {
        let token = self.sign(&user.id, AUTH_ACCESS)?;

        sqlx::query("INSERT INTO user_tokens (user_id, access, token) VALUES (?, ?, ?)")
            .bind(&user.id)
            .bind(AUTH_ACCESS)
            .bind(&token)
            .execute(&self.db)
            .await
            .map_err(|e| {
                error!(error = %e, user_id = %user.id, "Failed to persist issued token");
                ApiError::DatabaseError(e)
            })?;

        user.tokens.push(UserToken {
            access: AUTH_ACCESS.to_string(),
            token: token.clone(),
        });

        info!(user_id = %user.id, token = %safe_token_log(&token), "Session token issued");

        Ok(token)
    }

    /// Resolves a presented token to its owner
    ///
    /// Returns `Ok(None)` for forged, malformed, expired, non-`auth` and
    /// revoked tokens.
    pub async fn find_user_by_token(&self, token: &str) -> Result<Option<User>, ApiError> {
        let claims = match self.verify(token) {
            Some(c) => c,
            None => return Ok(None),
        };

        if claims.access != AUTH_ACCESS {
            warn!(access = %claims.access, "Token carries an unexpected access tag");
            return Ok(None);
        }

        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.email, u.password
            FROM users u
            JOIN user_tokens t ON t.user_id = u.id
            WHERE u.id = ? AND t.token = ? AND t.access = ?
            LIMIT 1
            "#,
        )
        .bind(&claims.sub)
        .bind(token)
        .bind(AUTH_ACCESS)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| {
            error!(
                error = %e,
                user_id = %claims.sub,
                "Database error during token lookup"
            );
            ApiError::DatabaseError(e)
        })?;

        match user {
            Some(mut u) => {
                u.tokens = load_tokens(&self.db, &u.id).await?;
                Ok(Some(u))
            }
            None => {
                debug!(user_id = %claims.sub, "Token signature valid but not in the user's token list");
                Ok(None)
            }
        }
    }

    /// Removes `token` from the user's token list; returns whether an entry was removed
    pub async fn remove_token(&self, user_id: &str, token: &str) -> Result<bool, ApiError> {
        let result = sqlx::query("DELETE FROM user_tokens WHERE user_id = ? AND token = ?")
            .bind(user_id)
            .bind(token)
            .execute(&self.db)
            .await?;

        let removed = result.rows_affected() > 0;
        if removed {
            info!(user_id = %user_id, token = %safe_token_log(token), "Session token revoked");
        }

        Ok(removed)
    }
}

/// Token list of a user in issuance order
pub async fn load_tokens(db: &SqlitePool, user_id: &str) -> Result<Vec<UserToken>, ApiError> {
    let tokens = sqlx::query_as::<_, UserToken>(
        "SELECT access, token FROM user_tokens WHERE user_id = ? ORDER BY seq ASC",
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;

    Ok(tokens)
}
