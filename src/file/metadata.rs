//! File metadata types and store for Cubby.
//!
//! Metadata records live in SQLite, separately from the blob store that
//! holds the content bytes. The store is capability-only: create, find,
//! and delete, always scoped by owner where listing is involved.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use thiserror::Error;

/// Metadata for a stored file.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FileRecord {
    /// Unique file ID, assigned by the store at creation.
    pub id: i64,
    /// User ID of the owner; immutable after creation.
    pub owner_id: i64,
    /// Blob store key (UUID.ext format); unique, immutable.
    pub storage_key: String,
    /// Original filename (display name).
    pub original_name: String,
    /// File size in bytes; equals the byte length of the stored content.
    pub size_bytes: i64,
    /// Declared MIME type of the content.
    pub mime_type: String,
    /// When the file was uploaded; sort key for listings.
    pub created_at: DateTime<Utc>,
}

/// Data for creating a new file record.
#[derive(Debug, Clone)]
pub struct NewFileRecord {
    /// User ID of the owner.
    pub owner_id: i64,
    /// Blob store key.
    pub storage_key: String,
    /// Original filename (display name).
    pub original_name: String,
    /// File size in bytes.
    pub size_bytes: i64,
    /// Declared MIME type.
    pub mime_type: String,
}

impl NewFileRecord {
    /// Create a new NewFileRecord.
    pub fn new(
        owner_id: i64,
        original_name: impl Into<String>,
        storage_key: impl Into<String>,
        size_bytes: i64,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            owner_id,
            storage_key: storage_key.into(),
            original_name: original_name.into(),
            size_bytes,
            mime_type: mime_type.into(),
        }
    }
}

/// Errors from the metadata store.
#[derive(Error, Debug)]
pub enum MetadataError {
    /// Database error.
    #[error("metadata store error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for MetadataError {
    fn from(e: sqlx::Error) -> Self {
        MetadataError::Database(e.to_string())
    }
}

/// Capability contract for the metadata store.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Create a new file record, returning it with the assigned ID.
    async fn create(&self, record: &NewFileRecord) -> Result<FileRecord, MetadataError>;

    /// Get a file record by ID.
    async fn find_by_id(&self, id: i64) -> Result<Option<FileRecord>, MetadataError>;

    /// List a user's file records, newest first.
    ///
    /// With `name_filter`, only records whose original name contains the
    /// term (case-insensitive substring match) are returned.
    async fn find_by_owner(
        &self,
        owner_id: i64,
        name_filter: Option<&str>,
    ) -> Result<Vec<FileRecord>, MetadataError>;

    /// Delete a file record by ID.
    ///
    /// Returns `true` if a record was deleted, `false` if none existed.
    async fn delete_by_id(&self, id: i64) -> Result<bool, MetadataError>;
}

/// SQLite-backed metadata store.
#[derive(Debug, Clone)]
pub struct SqliteMetadataStore {
    pool: SqlitePool,
}

impl SqliteMetadataStore {
    /// Create a new SqliteMetadataStore over the given pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

const SELECT_COLUMNS: &str =
    "id, owner_id, storage_key, original_name, size_bytes, mime_type, created_at";

/// Escape LIKE wildcards in a user-supplied search term.
fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[async_trait]
impl MetadataStore for SqliteMetadataStore {
    async fn create(&self, record: &NewFileRecord) -> Result<FileRecord, MetadataError> {
        let result = sqlx::query(
            "INSERT INTO files (owner_id, storage_key, original_name, size_bytes, mime_type)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(record.owner_id)
        .bind(&record.storage_key)
        .bind(&record.original_name)
        .bind(record.size_bytes)
        .bind(&record.mime_type)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        self.find_by_id(id)
            .await?
            .ok_or_else(|| MetadataError::Database("inserted record not found".to_string()))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<FileRecord>, MetadataError> {
        let record = sqlx::query_as::<_, FileRecord>(&format!(
            "SELECT {SELECT_COLUMNS} FROM files WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn find_by_owner(
        &self,
        owner_id: i64,
        name_filter: Option<&str>,
    ) -> Result<Vec<FileRecord>, MetadataError> {
        let records = match name_filter {
            Some(term) => {
                let pattern = format!("%{}%", escape_like(term));
                sqlx::query_as::<_, FileRecord>(&format!(
                    r#"SELECT {SELECT_COLUMNS} FROM files
                       WHERE owner_id = ?
                         AND LOWER(original_name) LIKE LOWER(?) ESCAPE '\'
                       ORDER BY created_at DESC, id DESC"#
                ))
                .bind(owner_id)
                .bind(pattern)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, FileRecord>(&format!(
                    "SELECT {SELECT_COLUMNS} FROM files
                     WHERE owner_id = ?
                     ORDER BY created_at DESC, id DESC"
                ))
                .bind(owner_id)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(records)
    }

    async fn delete_by_id(&self, id: i64) -> Result<bool, MetadataError> {
        let result = sqlx::query("DELETE FROM files WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
