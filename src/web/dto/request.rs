//! Request DTOs for the Web API.

use serde::Deserialize;

/// Login request.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Username.
    pub username: String,
    /// Password.
    pub password: String,
}

/// User registration request.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Password.
    pub password: String,
}

/// Query parameters for the file listing.
#[derive(Debug, Default, Deserialize)]
pub struct FileListQuery {
    /// Case-insensitive substring filter on the original filename.
    pub search: Option<String>,
}
