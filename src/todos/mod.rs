//! # Todos Module
//!
//! CRUD over todo items: creation with validation, listing, lookup,
//! partial updates that maintain `completedAt`, and deletion.

pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod validators;


pub use routes::todos_routes;
