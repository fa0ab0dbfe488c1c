//! Storage module for persisting crawl reports
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Persisting a finished report as one run (pages, texts, links, errors)
//! - Summary queries over stored runs

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::state::CrawlState;
use crate::SweepError;

use std::path::Path;

/// Initializes or opens a storage database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStorage)` - Successfully initialized storage
/// * `Err(SweepError)` - Failed to initialize storage
pub fn open_storage(path: &Path) -> Result<SqliteStorage, SweepError> {
    SqliteStorage::new(path)
}

/// Represents a stored crawl run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub seed_url: String,
    pub started_at: String,
    pub finished_at: String,
    pub config_hash: String,
    pub status: CrawlState,
    pub robots_found: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_storage_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runs.db");

        let storage = open_storage(&path).unwrap();
        assert!(path.exists());
        assert!(storage.get_latest_run().unwrap().is_none());
    }
}
