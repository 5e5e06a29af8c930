//! Authentication data models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Access tag carried by session tokens
pub const AUTH_ACCESS: &str = "auth";

/// Header that carries the session token in requests and responses
pub const AUTH_HEADER: &str = "x-auth";

/// JWT claims structure
///
/// `jti` is random per issuance, so every issued token string is unique.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Claims {
    pub sub: String,
    pub access: String,
    pub jti: String,
    pub iat: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<usize>,
}

/// Entry in a user's token list
#[derive(FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UserToken {
    pub access: String,
    pub token: String,
}

/// User database model
///
/// `password` holds the Argon2id hash and never leaves the server; responses
/// go through [`UserResponse`].
#[derive(FromRow, Debug, Clone)]
pub struct User {
    pub id: String,
    pub email: String,
    pub password: String,
    #[sqlx(skip)]
    pub tokens: Vec<UserToken>,
}

/// Public view of a user
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
        }
    }
}

/// Sign-up payload
#[derive(Deserialize, Debug)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Login payload
#[derive(Deserialize, Debug)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}
