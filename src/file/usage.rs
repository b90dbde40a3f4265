//! Storage usage accounting for Cubby.

use super::metadata::FileRecord;

/// A user's storage usage, computed from their metadata records.
///
/// Always derived from a fresh metadata read; never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageReport {
    /// Total bytes consumed by the user's files.
    pub used_bytes: u64,
    /// Number of files the user owns.
    pub file_count: usize,
    /// The configured quota in bytes.
    pub quota_bytes: u64,
}

impl UsageReport {
    /// Compute a usage report from a user's complete set of records.
    pub fn from_records(records: &[FileRecord], quota_bytes: u64) -> Self {
        let used_bytes = records.iter().map(|r| r.size_bytes.max(0) as u64).sum();
        Self {
            used_bytes,
            file_count: records.len(),
            quota_bytes,
        }
    }

    /// Percentage of the quota in use, rounded, capped at 100.
    pub fn percent(&self) -> u8 {
        if self.quota_bytes == 0 {
            return 0;
        }
        let ratio = self.used_bytes as f64 / self.quota_bytes as f64;
        (ratio.min(1.0) * 100.0).round() as u8
    }

    /// Used mebibytes, rounded to two decimals for display.
    pub fn used_mib(&self) -> f64 {
        let mib = self.used_bytes as f64 / (1024.0 * 1024.0);
        (mib * 100.0).round() / 100.0
    }

    /// The quota in whole mebibytes.
    pub fn quota_mib(&self) -> u64 {
        self.quota_bytes / (1024 * 1024)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(size_bytes: i64) -> FileRecord {
        FileRecord {
            id: 1,
            owner_id: 1,
            storage_key: "key.bin".to_string(),
            original_name: "file.bin".to_string(),
            size_bytes,
            mime_type: "application/octet-stream".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_from_records_sums_sizes() {
        let records = vec![record(100), record(250), record(50)];
        let usage = UsageReport::from_records(&records, 1000);

        assert_eq!(usage.used_bytes, 400);
        assert_eq!(usage.file_count, 3);
        assert_eq!(usage.quota_bytes, 1000);
    }

    #[test]
    fn test_empty_records() {
        let usage = UsageReport::from_records(&[], 1000);

        assert_eq!(usage.used_bytes, 0);
        assert_eq!(usage.file_count, 0);
        assert_eq!(usage.percent(), 0);
        assert_eq!(usage.used_mib(), 0.0);
    }

    #[test]
    fn test_percent_rounds() {
        let usage = UsageReport::from_records(&[record(100)], 1000);
        assert_eq!(usage.percent(), 10);

        let usage = UsageReport::from_records(&[record(125)], 1000);
        assert_eq!(usage.percent(), 13); // 12.5 rounds to 13

        let usage = UsageReport::from_records(&[record(4)], 1000);
        assert_eq!(usage.percent(), 0); // 0.4 rounds to 0
    }

    #[test]
    fn test_percent_caps_at_100() {
        let usage = UsageReport::from_records(&[record(2000)], 1000);
        assert_eq!(usage.percent(), 100);
    }

    #[test]
    fn test_percent_with_zero_quota() {
        let usage = UsageReport::from_records(&[record(100)], 0);
        assert_eq!(usage.percent(), 0);
    }

    #[test]
    fn test_used_mib_two_decimals() {
        // 1.5 MiB
        let usage = UsageReport::from_records(&[record(1_572_864)], 500 * 1024 * 1024);
        assert_eq!(usage.used_mib(), 1.5);

        // 1234567 bytes = 1.177375... MiB -> 1.18
        let usage = UsageReport::from_records(&[record(1_234_567)], 500 * 1024 * 1024);
        assert_eq!(usage.used_mib(), 1.18);
    }

    #[test]
    fn test_quota_mib() {
        let usage = UsageReport::from_records(&[], 524_288_000);
        assert_eq!(usage.quota_mib(), 500);
    }

    #[test]
    fn test_negative_sizes_ignored() {
        // size_bytes is constrained non-negative at creation; a damaged row
        // must not underflow the sum
        let records = vec![record(-5), record(100)];
        let usage = UsageReport::from_records(&records, 1000);
        assert_eq!(usage.used_bytes, 100);
    }
}
