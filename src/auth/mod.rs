//! # Auth Module
//!
//! This module handles user accounts and sessions:
//! - Sign-up and login with email/password (Argon2id hashes)
//! - Session tokens: HS256-signed claims recorded in the user's token list
//! - Revocation by removing the token from that list
//! - AuthedUser extractor for protected routes

pub mod extractors;
pub mod handlers;
pub mod models;
pub mod password;
pub mod routes;
pub mod services;
pub mod sessions;
pub mod validators;

#[cfg(test)]
mod tests;

pub use routes::auth_routes;
