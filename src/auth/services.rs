use sqlx::SqlitePool;
use tracing::{info, warn};

use super::models::{CreateUserRequest, LoginRequest, User};
use super::password::PasswordHasher;
use super::sessions::load_tokens;
use super::validators::{normalize_email, UserValidator};
use crate::common::{generate_user_id, safe_email_log, ApiError, ValidationError, Validator};

pub struct UsersService {
    db: SqlitePool,
    hasher: PasswordHasher,
}

impl UsersService {
    pub fn new(db: SqlitePool) -> Self {
        Self {
            db,
            hasher: PasswordHasher::new(),
        }
    }

    /// Validate, hash and insert a new user
    pub async fn create_user(&self, request: CreateUserRequest) -> Result<User, ApiError> {
        UserValidator.validate(&request).into_result()?;

        let id = generate_user_id();
        let email = normalize_email(&request.email);
        let hasher = self.hasher.clone();
        let password = request.password.clone();
        let password_hash = tokio::task::spawn_blocking(move || hasher.hash_password(&password))
            .await
            .map_err(|e| {
                ApiError::InternalServer(format!("Password hashing task failed: {}", e))
            })??;

        sqlx::query("INSERT INTO users (id, email, password) VALUES (?, ?, ?)")
            .bind(&id)
            .bind(&email)
            .bind(&password_hash)
            .execute(&self.db)
            .await
            .map_err(|e| {
                if is_duplicate_email(&e) {
                    ApiError::ValidationError(vec![ValidationError {
                        field: "email".to_string(),
                        message: format!("{} is already registered", email),
                    }])
                } else {
                    ApiError::DatabaseError(e)
                }
            })?;

        info!(user_id = %id, email = %safe_email_log(&email), "Created user");

        self.find_by_id(&id)
            .await?
            .ok_or_else(|| ApiError::InternalServer("created user vanished".to_string()))
    }

    /// Get user by ID, with its token list
    pub async fn find_by_id(&self, user_id: &str) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password FROM users WHERE id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        match user {
            Some(mut u) => {
                u.tokens = load_tokens(&self.db, &u.id).await?;
                Ok(Some(u))
            }
            None => Ok(None),
        }
    }

    /// Look up a user by email and check the password
    ///
    /// Unknown email and wrong password produce the same error.
    pub async fn find_by_credentials(&self, request: &LoginRequest) -> Result<User, ApiError> {
        UserValidator.validate(request).into_result()?;

        let email = normalize_email(&request.email);
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password FROM users WHERE email = ?",
        )
        .bind(&email)
        .fetch_optional(&self.db)
        .await?;

        let mut user = match user {
            Some(u) => u,
            None => {
                warn!(email = %safe_email_log(&email), "Login failed: unknown email");
                return Err(ApiError::BadRequest("Invalid email or password".to_string()));
            }
        };

        let hasher = self.hasher.clone();
        let password = request.password.clone();
        let stored_hash = user.password.clone();
        let matches =
            tokio::task::spawn_blocking(move || hasher.verify_password(&password, &stored_hash))
                .await
                .map_err(|e| {
                    ApiError::InternalServer(format!("Password verification task failed: {}", e))
                })??;

        if !matches {
            warn!(user_id = %user.id, "Login failed: wrong password");
            return Err(ApiError::BadRequest("Invalid email or password".to_string()));
        }

        user.tokens = load_tokens(&self.db, &user.id).await?;
        Ok(user)
    }
}

/// True when the error is the unique index on `users.email` firing
///
/// Other constraint failures, such as an id collision, stay database errors.
pub(crate) fn is_duplicate_email(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .map(|db_err| db_err.message().contains("UNIQUE constraint failed: users.email"))
        .unwrap_or(false)
}
