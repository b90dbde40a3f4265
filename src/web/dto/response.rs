//! Response DTOs for the Web API.

use serde::Serialize;

use crate::datetime::to_rfc3339;
use crate::file::{FileRecord, UsageReport};

/// Generic API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new API response.
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// User information in responses.
#[derive(Debug, Serialize)]
pub struct UserInfo {
    /// User ID.
    pub id: i64,
    /// Username.
    pub username: String,
    /// Email address.
    pub email: String,
}

/// Login / registration response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Access token (JWT).
    pub access_token: String,
    /// Access token expiry in seconds.
    pub expires_in: u64,
    /// User information.
    pub user: UserInfo,
}

/// Current user response (for /api/auth/me).
#[derive(Debug, Serialize)]
pub struct MeResponse {
    /// User ID.
    pub id: i64,
    /// Username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Account creation timestamp.
    pub created_at: String,
}

/// File metadata response.
#[derive(Debug, Serialize)]
pub struct FileResponse {
    /// File ID.
    pub id: i64,
    /// Original filename.
    pub original_name: String,
    /// File size in bytes.
    pub size_bytes: i64,
    /// MIME type.
    pub mime_type: String,
    /// Upload timestamp.
    pub created_at: String,
}

impl FileResponse {
    /// Build a response from a file record.
    pub fn from_record(record: &FileRecord) -> Self {
        Self {
            id: record.id,
            original_name: record.original_name.clone(),
            size_bytes: record.size_bytes,
            mime_type: record.mime_type.clone(),
            created_at: to_rfc3339(&record.created_at),
        }
    }
}

/// Storage usage statistics.
#[derive(Debug, Serialize)]
pub struct UsageStats {
    /// Bytes in use.
    pub used_bytes: u64,
    /// Mebibytes in use, rounded to two decimals.
    pub used_mib: f64,
    /// The quota in whole mebibytes.
    pub quota_mib: u64,
    /// Percentage of the quota in use (0-100).
    pub percent: u8,
    /// Number of stored files.
    pub file_count: usize,
}

impl UsageStats {
    /// Build stats from a usage report.
    pub fn from_report(usage: &UsageReport) -> Self {
        Self {
            used_bytes: usage.used_bytes,
            used_mib: usage.used_mib(),
            quota_mib: usage.quota_mib(),
            percent: usage.percent(),
            file_count: usage.file_count,
        }
    }
}

/// File listing response with usage statistics from the same read.
#[derive(Debug, Serialize)]
pub struct FileListResponse {
    /// The files, newest first.
    pub files: Vec<FileResponse>,
    /// Usage statistics.
    pub stats: UsageStats,
}

/// File upload response.
#[derive(Debug, Serialize)]
pub struct FileUploadResponse {
    /// The created file.
    pub file: FileResponse,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_file_response_from_record() {
        let record = FileRecord {
            id: 7,
            owner_id: 1,
            storage_key: "abc.txt".to_string(),
            original_name: "notes.txt".to_string(),
            size_bytes: 42,
            mime_type: "text/plain".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        };

        let response = FileResponse::from_record(&record);

        assert_eq!(response.id, 7);
        assert_eq!(response.original_name, "notes.txt");
        assert_eq!(response.size_bytes, 42);
        assert_eq!(response.mime_type, "text/plain");
        assert_eq!(response.created_at, "2024-05-01T12:00:00Z");
    }

    #[test]
    fn test_usage_stats_from_report() {
        let report = UsageReport {
            used_bytes: 52_428_800, // 50 MiB
            file_count: 3,
            quota_bytes: 524_288_000, // 500 MiB
        };

        let stats = UsageStats::from_report(&report);

        assert_eq!(stats.used_bytes, 52_428_800);
        assert_eq!(stats.used_mib, 50.0);
        assert_eq!(stats.quota_mib, 500);
        assert_eq!(stats.percent, 10);
        assert_eq!(stats.file_count, 3);
    }
}
