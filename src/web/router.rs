//! Router configuration for the Web API.

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::{
    delete_file, download_file, list_files, login, me, register, upload_file, usage, AppState,
};
use super::middleware::{create_cors_layer, jwt_auth, JwtState};

/// Extra body headroom on top of the quota for multipart framing.
const UPLOAD_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Create the main API router.
pub fn create_router(
    app_state: Arc<AppState>,
    jwt_state: Arc<JwtState>,
    cors_origins: &[String],
) -> Router {
    // Auth routes (no authentication required)
    let auth_public_routes = Router::new()
        .route("/login", post(login))
        .route("/register", post(register));

    // Auth routes (authentication required)
    let auth_protected_routes = Router::new().route("/me", get(me));

    let auth_routes = Router::new()
        .merge(auth_public_routes)
        .merge(auth_protected_routes);

    // File routes (authentication required)
    let file_routes = Router::new()
        .route("/", get(list_files).post(upload_file))
        .route("/:id", delete(delete_file))
        .route("/:id/download", get(download_file));

    // API routes
    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/files", file_routes)
        .route("/usage", get(usage));

    // The quota check in the file service is the authority on upload
    // admission; the transport limit only has to stay out of its way.
    let body_limit = app_state.files.quota_bytes() as usize + UPLOAD_OVERHEAD_BYTES;

    // Clone jwt_state for the middleware closure
    let jwt_state_for_middleware = jwt_state.clone();

    Router::new()
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins))
                .layer(middleware::from_fn(move |req, next| {
                    let state = jwt_state_for_middleware.clone();
                    jwt_auth(state, req, next)
                }))
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_health_router() {
        let _router = create_health_router();
        // Should not panic
    }
}
