//! File management module for Cubby.
//!
//! This module provides the quota-enforced file lifecycle:
//! - Blob storage with UUID naming (`storage`)
//! - File metadata records (`metadata`)
//! - Usage accounting against a per-user quota (`usage`)
//! - The lifecycle service coordinating the two stores (`service`)
//!
//! The blob store and the metadata store fail independently; `FileService`
//! sequences every mutation that touches both and compensates when the
//! second step fails.

mod metadata;
mod service;
mod storage;
mod usage;

pub use metadata::{FileRecord, MetadataError, MetadataStore, NewFileRecord, SqliteMetadataStore};
pub use service::{DownloadResult, FileError, FileListing, FileService, UploadRequest};
pub use storage::{storage_key_for, BlobError, BlobStore, DiskBlobStore};
pub use usage::UsageReport;

/// Default per-user storage quota (500 MiB).
pub const DEFAULT_QUOTA_BYTES: u64 = 500 * 1024 * 1024;

/// Maximum length for an uploaded file's display name (in characters).
pub const MAX_FILENAME_LENGTH: usize = 255;
