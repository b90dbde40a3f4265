use std::sync::Arc;

use tracing::info;

use cubby::config::Config;
use cubby::db::Database;
use cubby::file::{DiskBlobStore, FileService, SqliteMetadataStore};
use cubby::web::WebServer;

#[tokio::main]
async fn main() {
    // Load configuration
    let mut config = match Config::load("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    };
    config.apply_env_overrides();

    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {e}");
        std::process::exit(1);
    }

    // Initialize logging
    if let Err(e) = cubby::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        cubby::logging::init_console_only(&config.logging.level);
    }

    info!("Cubby - Personal file storage service");

    let db = match Database::open(&config.database.path).await {
        Ok(db) => Arc::new(db),
        Err(e) => {
            tracing::error!("Failed to open database: {e}");
            std::process::exit(1);
        }
    };

    let blobs = match DiskBlobStore::new(&config.storage.path) {
        Ok(blobs) => Arc::new(blobs),
        Err(e) => {
            tracing::error!("Failed to initialize blob storage: {e}");
            std::process::exit(1);
        }
    };
    info!("Blob storage initialized at: {}", config.storage.path);

    let metadata = Arc::new(SqliteMetadataStore::new(db.pool().clone()));
    let files = Arc::new(
        FileService::new(metadata, blobs).with_quota_bytes(config.storage.quota_bytes()),
    );
    info!("Per-user quota: {} MiB", config.storage.quota_mb);

    let server = WebServer::new(&config.server, db, files);
    if let Err(e) = server.run().await {
        tracing::error!("Web server error: {e}");
        std::process::exit(1);
    }
}
