//! Cubby - Personal file storage service.
//!
//! Authenticated users upload, list, search, download, and delete files
//! under a hard per-user storage quota. Content bytes live in a blob
//! store; metadata lives in SQLite. The two stores fail independently,
//! and the file lifecycle service keeps them convergent.

pub mod auth;
pub mod config;
pub mod datetime;
pub mod db;
pub mod error;
pub mod file;
pub mod logging;
pub mod web;

pub use auth::{hash_password, validate_password, verify_password, PasswordError};
pub use config::Config;
pub use db::Database;
pub use error::{CubbyError, Result};
