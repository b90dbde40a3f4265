//! File lifecycle service for Cubby.
//!
//! `FileService` coordinates the blob store and the metadata store, which
//! fail independently and share no transaction boundary. Every mutation
//! that touches both stores is an ordered two-step workflow:
//!
//! - Upload writes the blob first, then the metadata record. If the record
//!   cannot be created, the just-written blob is deleted as compensation;
//!   an orphaned blob is invisible and reclaimable, an orphaned record
//!   would be a user-visible broken file.
//! - Delete removes the metadata record first, then the blob. Once the
//!   record is gone the file is unreachable, so a failed blob delete only
//!   leaves a reclaimable orphan and never fails the operation.
//!
//! Orphans are logged at warning level with enough context for an
//! out-of-band sweep; store failures are logged at error level.
//!
//! The service is stateless and holds no locks. The quota check in
//! `upload` is advisory under concurrent uploads by the same user: two
//! simultaneous uploads can both pass the check and jointly exceed the
//! quota. Accepted trade-off for low per-user concurrency.

use std::sync::Arc;

use thiserror::Error;
use tracing::{error, warn};

use super::metadata::{FileRecord, MetadataError, MetadataStore, NewFileRecord};
use super::storage::{storage_key_for, BlobError, BlobStore};
use super::usage::UsageReport;
use super::DEFAULT_QUOTA_BYTES;

/// Outcome taxonomy for file lifecycle operations.
///
/// `NoContent`, `QuotaExceeded`, and `NotFound` are rejections of the
/// caller's request; the remaining variants are store failures terminating
/// a single operation.
#[derive(Error, Debug)]
pub enum FileError {
    /// No file content was supplied.
    #[error("no file content provided")]
    NoContent,

    /// The upload would exceed the owner's storage quota.
    #[error("storage quota exceeded: {used_bytes} bytes used + {incoming_bytes} incoming > {quota_bytes} quota")]
    QuotaExceeded {
        /// Bytes already consumed.
        used_bytes: u64,
        /// Size of the rejected upload.
        incoming_bytes: u64,
        /// The configured quota.
        quota_bytes: u64,
    },

    /// The file does not exist for this owner.
    ///
    /// Also returned when the file belongs to another user, so a non-owner
    /// can never confirm a file's existence.
    #[error("file not found")]
    NotFound,

    /// Writing the content to the blob store failed.
    #[error("blob write failed for {key}: {source}")]
    BlobWrite {
        /// The storage key of the failed write.
        key: String,
        /// The underlying blob store error.
        source: BlobError,
    },

    /// Reading the content from the blob store failed.
    #[error("blob read failed for {key}: {source}")]
    BlobRead {
        /// The storage key of the failed read.
        key: String,
        /// The underlying blob store error.
        source: BlobError,
    },

    /// Deleting the content from the blob store failed.
    #[error("blob delete failed for {key}: {source}")]
    BlobDelete {
        /// The storage key of the failed delete.
        key: String,
        /// The underlying blob store error.
        source: BlobError,
    },

    /// Reading from the metadata store failed.
    #[error("metadata read failed: {0}")]
    MetadataRead(MetadataError),

    /// Creating the metadata record failed.
    #[error("metadata write failed: {0}")]
    MetadataWrite(MetadataError),

    /// Deleting the metadata record failed.
    #[error("metadata delete failed for file {id}: {source}")]
    MetadataDelete {
        /// The record ID of the failed delete.
        id: i64,
        /// The underlying metadata store error.
        source: MetadataError,
    },
}

/// Request data for a file upload.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    /// Original filename (display name).
    pub original_name: String,
    /// Declared MIME type of the content.
    pub mime_type: String,
    /// File content.
    pub content: Vec<u8>,
}

impl UploadRequest {
    /// Create a new upload request with an octet-stream content type.
    pub fn new(original_name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            original_name: original_name.into(),
            mime_type: "application/octet-stream".to_string(),
            content,
        }
    }

    /// Set the declared MIME type.
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }
}

/// Result of a file download.
#[derive(Debug)]
pub struct DownloadResult {
    /// File metadata.
    pub record: FileRecord,
    /// File content.
    pub content: Vec<u8>,
}

/// A file listing paired with the usage report from the same read.
#[derive(Debug)]
pub struct FileListing {
    /// The owner's files, newest first.
    pub files: Vec<FileRecord>,
    /// Usage computed from the current metadata state.
    pub usage: UsageReport,
}

/// File lifecycle service coordinating the blob and metadata stores.
pub struct FileService {
    metadata: Arc<dyn MetadataStore>,
    blobs: Arc<dyn BlobStore>,
    quota_bytes: u64,
}

impl FileService {
    /// Create a new FileService with the default quota.
    pub fn new(metadata: Arc<dyn MetadataStore>, blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            metadata,
            blobs,
            quota_bytes: DEFAULT_QUOTA_BYTES,
        }
    }

    /// Create a new FileService with a custom quota.
    pub fn with_quota_bytes(mut self, quota_bytes: u64) -> Self {
        self.quota_bytes = quota_bytes;
        self
    }

    /// Get the configured quota in bytes.
    pub fn quota_bytes(&self) -> u64 {
        self.quota_bytes
    }

    /// Compute the owner's current storage usage.
    ///
    /// Pure read; always reflects the current metadata store state.
    pub async fn usage(&self, owner_id: i64) -> Result<UsageReport, FileError> {
        let records = self
            .metadata
            .find_by_owner(owner_id, None)
            .await
            .map_err(FileError::MetadataRead)?;

        Ok(UsageReport::from_records(&records, self.quota_bytes))
    }

    /// List the owner's files, newest first, with the usage report
    /// computed from the same read.
    ///
    /// With `search`, the listing is narrowed to files whose name contains
    /// the term (case-insensitive); usage still covers all files.
    pub async fn list(
        &self,
        owner_id: i64,
        search: Option<&str>,
    ) -> Result<FileListing, FileError> {
        let files = self
            .metadata
            .find_by_owner(owner_id, search)
            .await
            .map_err(FileError::MetadataRead)?;

        let usage = match search {
            Some(_) => {
                let all = self
                    .metadata
                    .find_by_owner(owner_id, None)
                    .await
                    .map_err(FileError::MetadataRead)?;
                UsageReport::from_records(&all, self.quota_bytes)
            }
            None => UsageReport::from_records(&files, self.quota_bytes),
        };

        Ok(FileListing { files, usage })
    }

    /// Upload a file for the owner.
    ///
    /// Blob first, metadata second. The record is created only after the
    /// blob write succeeded; on metadata failure the blob is deleted again.
    pub async fn upload(
        &self,
        owner_id: i64,
        request: &UploadRequest,
    ) -> Result<FileRecord, FileError> {
        if request.content.is_empty() {
            return Err(FileError::NoContent);
        }

        let usage = self.usage(owner_id).await?;
        let incoming_bytes = request.content.len() as u64;
        if usage.used_bytes + incoming_bytes > self.quota_bytes {
            return Err(FileError::QuotaExceeded {
                used_bytes: usage.used_bytes,
                incoming_bytes,
                quota_bytes: self.quota_bytes,
            });
        }

        let storage_key = storage_key_for(&request.original_name);

        if let Err(source) = self
            .blobs
            .put(&storage_key, &request.content, &request.mime_type)
            .await
        {
            error!(
                owner_id,
                storage_key = %storage_key,
                error = %source,
                "blob write failed, upload aborted"
            );
            return Err(FileError::BlobWrite {
                key: storage_key,
                source,
            });
        }

        let new_record = NewFileRecord::new(
            owner_id,
            &request.original_name,
            &storage_key,
            request.content.len() as i64,
            &request.mime_type,
        );

        match self.metadata.create(&new_record).await {
            Ok(record) => Ok(record),
            Err(source) => {
                error!(
                    owner_id,
                    storage_key = %storage_key,
                    error = %source,
                    "metadata write failed after blob write, compensating"
                );
                if let Err(cleanup) = self.blobs.delete(&storage_key).await {
                    warn!(
                        owner_id,
                        storage_key = %storage_key,
                        error = %cleanup,
                        "compensating blob delete failed, blob orphaned"
                    );
                }
                Err(FileError::MetadataWrite(source))
            }
        }
    }

    /// Download a file's content and metadata.
    ///
    /// A file owned by another user is reported as `NotFound`.
    pub async fn download(
        &self,
        owner_id: i64,
        file_id: i64,
    ) -> Result<DownloadResult, FileError> {
        let record = self
            .metadata
            .find_by_id(file_id)
            .await
            .map_err(FileError::MetadataRead)?
            .ok_or(FileError::NotFound)?;

        if record.owner_id != owner_id {
            return Err(FileError::NotFound);
        }

        // A missing blob here means a past reconciliation gap; surface it
        // as a read failure, not as a missing file.
        let content = match self.blobs.get(&record.storage_key).await {
            Ok(content) => content,
            Err(source) => {
                error!(
                    owner_id,
                    file_id,
                    storage_key = %record.storage_key,
                    error = %source,
                    "blob read failed for existing record"
                );
                return Err(FileError::BlobRead {
                    key: record.storage_key,
                    source,
                });
            }
        };

        Ok(DownloadResult { record, content })
    }

    /// Delete a file owned by the caller.
    ///
    /// Metadata first, blob second. Once the record is deleted the
    /// operation succeeds even if the blob delete fails; the orphaned blob
    /// is logged for later reconciliation.
    pub async fn delete(&self, owner_id: i64, file_id: i64) -> Result<(), FileError> {
        let record = self
            .metadata
            .find_by_id(file_id)
            .await
            .map_err(FileError::MetadataRead)?
            .ok_or(FileError::NotFound)?;

        // Ownership is checked before any destructive step. A foreign file
        // is indistinguishable from a missing one.
        if record.owner_id != owner_id {
            return Err(FileError::NotFound);
        }

        match self.metadata.delete_by_id(file_id).await {
            Ok(true) => {}
            Ok(false) => return Err(FileError::NotFound),
            Err(source) => {
                error!(
                    owner_id,
                    file_id,
                    error = %source,
                    "metadata delete failed, file left intact"
                );
                return Err(FileError::MetadataDelete {
                    id: file_id,
                    source,
                });
            }
        }

        if let Err(e) = self.blobs.delete(&record.storage_key).await {
            warn!(
                owner_id,
                file_id,
                storage_key = %record.storage_key,
                error = %e,
                "blob delete failed after metadata delete, blob orphaned"
            );
        }

        Ok(())
    }
}
