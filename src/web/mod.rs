//! Web API module for Cubby.
//!
//! This module provides the REST API: authentication endpoints and the
//! file upload/download/listing surface over the file lifecycle service.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use router::create_router;
pub use server::WebServer;
