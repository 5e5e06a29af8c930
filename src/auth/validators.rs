// src/auth/validators.rs

use regex::Regex;
use std::sync::LazyLock;

use super::models::{CreateUserRequest, LoginRequest};
use crate::common::{ValidationResult, Validator};

pub const PASSWORD_MIN_LENGTH: usize = 8;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9-]+(\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}$")
        .expect("email pattern compiles")
});

/// Returns true when `email` (already trimmed) looks like an address
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Canonical form used for storage and lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub struct UserValidator;

impl Validator<CreateUserRequest> for UserValidator {
    fn validate(&self, data: &CreateUserRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        let email = data.email.trim();
        if email.is_empty() {
            result.add_error("email", "Email is required");
        } else if !is_valid_email(email) {
            result.add_error("email", &format!("{} is not a valid e-mail", email));
        }

        if data.password.is_empty() {
            result.add_error("password", "Password is required");
        } else if data.password.chars().count() < PASSWORD_MIN_LENGTH {
            result.add_error(
                "password",
                &format!(
                    "Password must be at least {} characters",
                    PASSWORD_MIN_LENGTH
                ),
            );
        }

        result
    }
}

impl Validator<LoginRequest> for UserValidator {
    fn validate(&self, data: &LoginRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.email.trim().is_empty() {
            result.add_error("email", "Email is required");
        }
        if data.password.is_empty() {
            result.add_error("password", "Password is required");
        }

        result
    }
}
