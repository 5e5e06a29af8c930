// src/common/id_generator.rs
//! Crockford Base32 ID Generator
//!
//! Generates human-readable, prefixed IDs using Crockford Base32 encoding.
//! Format: PREFIX_XXXXXX (e.g., T_K7NP3X for todos)
//!
//! Path parameters are checked with [`is_valid_id`] before touching the
//! database, so a malformed id can be answered with 404 straight away.

use rand::Rng;

/// Crockford Base32 alphabet (excludes I, L, O, U to avoid confusion)
const CROCKFORD_ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// Number of random characters after the prefix
const ID_BODY_LENGTH: usize = 6;

/// Entity type prefixes for ID generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityPrefix {
    /// User account (U_)
    User,
    /// Todo item (T_)
    Todo,
}

impl EntityPrefix {
    /// Get the string prefix for this entity type
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityPrefix::User => "U",
            EntityPrefix::Todo => "T",
        }
    }
}

/// Generate a random Crockford Base32 string of specified length
fn generate_crockford_string(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..32);
            CROCKFORD_ALPHABET[idx] as char
        })
        .collect()
}

/// Generate a prefixed ID, e.g. "U_8MWQT2"
pub fn generate_id(prefix: EntityPrefix) -> String {
    format!(
        "{}_{}",
        prefix.as_str(),
        generate_crockford_string(ID_BODY_LENGTH)
    )
}

/// Generate a User ID (U_XXXXXX)
pub fn generate_user_id() -> String {
    generate_id(EntityPrefix::User)
}

/// Generate a Todo ID (T_XXXXXX)
pub fn generate_todo_id() -> String {
    generate_id(EntityPrefix::Todo)
}

/// Generate a raw Crockford Base32 string without prefix
pub fn generate_raw_id(length: usize) -> String {
    generate_crockford_string(length)
}

/// Checks that `id` has the shape produced by [`generate_id`] for `prefix`
pub fn is_valid_id(prefix: EntityPrefix, id: &str) -> bool {
    match id.split_once('_') {
        Some((head, body)) => {
            head == prefix.as_str()
                && body.len() == ID_BODY_LENGTH
                && body.bytes().all(|b| CROCKFORD_ALPHABET.contains(&b))
        }
        None => false,
    }
}
