//! Web server for Cubby.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::file::FileService;
use crate::Database;

use super::handlers::AppState;
use super::middleware::JwtState;
use super::router::{create_health_router, create_router};

/// Web server for the API.
pub struct WebServer {
    /// Server address.
    addr: SocketAddr,
    /// Application state.
    app_state: Arc<AppState>,
    /// JWT state.
    jwt_state: Arc<JwtState>,
    /// CORS allowed origins.
    cors_origins: Vec<String>,
}

impl WebServer {
    /// Create a new web server.
    pub fn new(config: &ServerConfig, db: Arc<Database>, files: Arc<FileService>) -> Self {
        let addr = format!("{}:{}", config.host, config.port)
            .parse()
            .expect("Invalid web server address");

        let app_state = Arc::new(AppState::new(
            db,
            files,
            &config.jwt_secret,
            config.jwt_access_token_expiry_secs,
        ));

        let jwt_state = Arc::new(JwtState::new(&config.jwt_secret));

        Self {
            addr,
            app_state,
            jwt_state,
            cors_origins: config.cors_origins.clone(),
        }
    }

    /// Get the server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Run the web server.
    pub async fn run(self) -> Result<(), std::io::Error> {
        let router = create_router(self.app_state, self.jwt_state, &self.cors_origins)
            .merge(create_health_router());

        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;

        tracing::info!("Web server listening on http://{}", local_addr);

        axum::serve(listener, router).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::{DiskBlobStore, SqliteMetadataStore};

    fn create_test_config() -> ServerConfig {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0, // Use random port
            cors_origins: vec![],
            jwt_secret: "test-secret-key".to_string(),
            jwt_access_token_expiry_secs: 900,
        }
    }

    #[tokio::test]
    async fn test_web_server_new() {
        let config = create_test_config();
        let db = Arc::new(Database::open_in_memory().await.unwrap());
        let temp_dir = tempfile::TempDir::new().unwrap();

        let metadata = Arc::new(SqliteMetadataStore::new(db.pool().clone()));
        let blobs = Arc::new(DiskBlobStore::new(temp_dir.path()).unwrap());
        let files = Arc::new(FileService::new(metadata, blobs));

        let server = WebServer::new(&config, db, files);
        assert_eq!(server.addr().ip().to_string(), "127.0.0.1");
    }
}
