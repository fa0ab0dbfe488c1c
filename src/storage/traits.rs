//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::output::CrawlReport;
use crate::storage::RunRecord;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// A backend persists finished crawl reports, one run per report, and
/// answers summary queries about stored runs.
pub trait Storage {
    /// Stores a finished crawl report as a new run
    ///
    /// # Arguments
    ///
    /// * `report` - The report to store
    /// * `seed_url` - The URL the crawl started from
    /// * `config_hash` - Hash of the configuration file
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn save_report(
        &mut self,
        report: &CrawlReport,
        seed_url: &str,
        config_hash: &str,
    ) -> StorageResult<i64>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recently stored run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    /// Counts the recorded pages of a run
    fn count_pages(&self, run_id: i64) -> StorageResult<u64>;

    /// Counts the link edges of a run
    fn count_links(&self, run_id: i64) -> StorageResult<u64>;

    /// Counts the errors of a run
    fn count_errors(&self, run_id: i64) -> StorageResult<u64>;

    /// Gets the unique prose runs of a run in crawl order
    fn get_unique_texts(&self, run_id: i64) -> StorageResult<Vec<String>>;

    /// Gets the pages linking to a URL within a run
    fn get_referrers(&self, run_id: i64, target_url: &str) -> StorageResult<Vec<String>>;
}
