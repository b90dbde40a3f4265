//! Blob storage for Cubby.
//!
//! Content bytes are stored under opaque string keys, with no query
//! capability. The on-disk implementation uses UUID-based keys sharded
//! by the first 2 characters of the key.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

/// Errors from a blob store.
#[derive(Error, Debug)]
pub enum BlobError {
    /// No blob exists under the given key.
    #[error("blob {0} not found")]
    NotFound(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Capability contract for a blob store.
///
/// Keys are opaque strings unique within the store. `delete` is idempotent:
/// deleting an absent key succeeds.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store content under the given key.
    async fn put(&self, key: &str, content: &[u8], content_type: &str) -> Result<(), BlobError>;

    /// Load the content stored under the given key.
    async fn get(&self, key: &str) -> Result<Vec<u8>, BlobError>;

    /// Delete the content stored under the given key.
    async fn delete(&self, key: &str) -> Result<(), BlobError>;
}

/// Generate a new storage key for an upload.
///
/// The key is a random UUID with the original filename's extension
/// (or "bin" when there is none); the original name itself is never part
/// of the key, only metadata.
pub fn storage_key_for(original_name: &str) -> String {
    let uuid = Uuid::new_v4();
    let ext = extract_extension(original_name);
    format!("{uuid}.{ext}")
}

/// Extract the file extension from a filename.
///
/// Returns "bin" if no extension is found.
fn extract_extension(filename: &str) -> &str {
    Path::new(filename)
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("bin")
}

/// On-disk blob store.
///
/// Blobs are stored in a sharded directory structure:
/// ```text
/// {base_path}/
/// ├── ab/
/// │   └── ab12cd34-5678-90ab-cdef-123456789012.txt
/// ├── cd/
/// │   └── cd90ab12-3456-7890-abcd-ef1234567890.bin
/// └── ...
/// ```
#[derive(Debug, Clone)]
pub struct DiskBlobStore {
    /// Base directory for blob storage.
    base_path: PathBuf,
}

impl DiskBlobStore {
    /// Create a new DiskBlobStore with the given base path.
    ///
    /// The base directory will be created if it doesn't exist.
    pub fn new(base_path: impl Into<PathBuf>) -> Result<Self, BlobError> {
        let base_path = base_path.into();
        std::fs::create_dir_all(&base_path)?;

        Ok(Self { base_path })
    }

    /// Get the base path of this store.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Check if a blob exists under the given key.
    pub fn exists(&self, key: &str) -> bool {
        self.blob_path(key).exists()
    }

    /// Get the full file path for a key.
    ///
    /// The path is constructed as: {base_path}/{shard}/{key}
    /// where shard is the first 2 characters of the key.
    fn blob_path(&self, key: &str) -> PathBuf {
        let shard = Self::shard(key);
        self.base_path.join(shard).join(key)
    }

    /// Get the shard directory name for a key.
    fn shard(key: &str) -> &str {
        if key.len() >= 2 {
            &key[..2]
        } else {
            key
        }
    }
}

#[async_trait]
impl BlobStore for DiskBlobStore {
    async fn put(&self, key: &str, content: &[u8], _content_type: &str) -> Result<(), BlobError> {
        let path = self.blob_path(key);

        // Create the shard directory if it doesn't exist
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&path, content).await?;

        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, BlobError> {
        let path = self.blob_path(key);

        match tokio::fs::read(&path).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(BlobError::NotFound(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), BlobError> {
        let path = self.blob_path(key);

        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
