//! API handlers for the Web API.

pub mod auth;
pub mod file;

pub use auth::*;
pub use file::*;

use jsonwebtoken::{encode, EncodingKey, Header};
use std::sync::Arc;

use crate::db::Database;
use crate::file::FileService;
use crate::web::error::ApiError;
use crate::web::middleware::JwtClaims;

/// Thread-safe database handle shared across handlers.
pub type SharedDatabase = Arc<Database>;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database handle.
    pub db: SharedDatabase,
    /// File lifecycle service.
    pub files: Arc<FileService>,
    /// JWT encoding key.
    pub encoding_key: EncodingKey,
    /// Access token expiry in seconds.
    pub access_token_expiry: u64,
}

impl AppState {
    /// Create a new application state.
    pub fn new(
        db: SharedDatabase,
        files: Arc<FileService>,
        jwt_secret: &str,
        access_token_expiry: u64,
    ) -> Self {
        Self {
            db,
            files,
            encoding_key: EncodingKey::from_secret(jwt_secret.as_bytes()),
            access_token_expiry,
        }
    }

    /// Generate an access token for a user.
    pub fn generate_access_token(&self, user_id: i64, username: &str) -> Result<String, ApiError> {
        let now = chrono::Utc::now().timestamp() as u64;
        let claims = JwtClaims {
            sub: user_id,
            username: username.to_string(),
            iat: now,
            exp: now + self.access_token_expiry,
            jti: uuid::Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode JWT: {}", e);
            ApiError::internal("Failed to generate token")
        })
    }
}
