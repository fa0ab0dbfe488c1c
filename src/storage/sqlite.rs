//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::output::CrawlReport;
use crate::state::CrawlState;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::RunRecord;
use crate::SweepError;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashSet;
use std::path::Path;

const RUN_COLUMNS: &str =
    "id, seed_url, started_at, finished_at, config_hash, status, robots_txt IS NOT NULL";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(SweepError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, SweepError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> Result<Self, SweepError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn count(&self, sql: &str, run_id: i64) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(sql, params![run_id], |row| row.get(0))?;
        Ok(count as u64)
    }
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        seed_url: row.get(1)?,
        started_at: row.get(2)?,
        finished_at: row.get(3)?,
        config_hash: row.get(4)?,
        status: CrawlState::from_db_string(&row.get::<_, String>(5)?).unwrap_or(CrawlState::Done),
        robots_found: row.get(6)?,
    })
}

/// Flags the first occurrence of each unique text among the regular texts
///
/// Unique texts are an ordered subsequence of the regular ones.
fn unique_flags(texts: &[String], unique: &[String]) -> Vec<bool> {
    let mut pending = unique.iter().peekable();
    texts
        .iter()
        .map(|text| {
            if pending.peek().is_some_and(|u| *u == text) {
                pending.next();
                true
            } else {
                false
            }
        })
        .collect()
}

fn to_json<T: serde::Serialize>(value: &T) -> StorageResult<String> {
    serde_json::to_string(value).map_err(|e| StorageError::Serialization(e.to_string()))
}

impl Storage for SqliteStorage {
    fn save_report(
        &mut self,
        report: &CrawlReport,
        seed_url: &str,
        config_hash: &str,
    ) -> StorageResult<i64> {
        let tx = self.conn.transaction()?;

        tx.execute(
            "INSERT INTO runs (seed_url, started_at, finished_at, config_hash, status, robots_txt)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                seed_url,
                report.started_at.to_rfc3339(),
                report.finished_at.to_rfc3339(),
                config_hash,
                report.status.to_db_string(),
                report.robots,
            ],
        )?;
        let run_id = tx.last_insert_rowid();

        {
            let mut insert_page = tx.prepare(
                "INSERT INTO pages (run_id, url, title, http_code, size, loading_time_ms,
                 headers_json, redirect_target, html)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            )?;
            let mut insert_text = tx.prepare(
                "INSERT INTO page_texts (page_id, position, text, is_unique) VALUES (?1, ?2, ?3, ?4)",
            )?;

            for (url, page) in &report.urls {
                insert_page.execute(params![
                    run_id,
                    url,
                    page.title,
                    page.http_code,
                    page.size as i64,
                    page.loading_time,
                    to_json(&page.headers)?,
                    page.redirect_target,
                    page.html,
                ])?;
                let page_id = tx.last_insert_rowid();

                let flags = unique_flags(&page.texts, &page.unique_texts);
                for (position, (text, is_unique)) in page.texts.iter().zip(flags).enumerate() {
                    insert_text.execute(params![page_id, position as i64, text, is_unique])?;
                }
            }

            let mut insert_link = tx.prepare(
                "INSERT OR IGNORE INTO links (run_id, source_url, target_url) VALUES (?1, ?2, ?3)",
            )?;
            for (source, targets) in &report.url_references {
                for target in targets {
                    insert_link.execute(params![run_id, source, target])?;
                }
            }

            let followed: HashSet<&str> = report.followed_urls.iter().map(String::as_str).collect();
            let mut insert_url = tx.prepare(
                "INSERT INTO discovered_urls (run_id, position, url, followed) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for (position, url) in report.all_urls.iter().enumerate() {
                insert_url.execute(params![
                    run_id,
                    position as i64,
                    url,
                    followed.contains(url.as_str())
                ])?;
            }

            let mut insert_error = tx.prepare(
                "INSERT INTO crawl_errors (run_id, url, message, trace_json) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for error in &report.errors {
                insert_error.execute(params![
                    run_id,
                    error.url,
                    error.message,
                    to_json(&error.context)?
                ])?;
            }
        }

        tx.commit()?;

        tracing::debug!(
            run_id,
            pages = report.urls.len(),
            errors = report.errors.len(),
            "Stored crawl report"
        );
        Ok(run_id)
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM runs WHERE id = ?1", RUN_COLUMNS),
                params![run_id],
                run_from_row,
            )
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                &format!("SELECT {} FROM runs ORDER BY id DESC LIMIT 1", RUN_COLUMNS),
                [],
                run_from_row,
            )
            .optional()?;

        Ok(run)
    }

    fn count_pages(&self, run_id: i64) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM pages WHERE run_id = ?1", run_id)
    }

    fn count_links(&self, run_id: i64) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM links WHERE run_id = ?1", run_id)
    }

    fn count_errors(&self, run_id: i64) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM crawl_errors WHERE run_id = ?1", run_id)
    }

    fn get_unique_texts(&self, run_id: i64) -> StorageResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT t.text FROM page_texts t
             JOIN pages p ON p.id = t.page_id
             WHERE p.run_id = ?1 AND t.is_unique = 1
             ORDER BY p.id, t.position",
        )?;

        let texts = stmt
            .query_map(params![run_id], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(texts)
    }

    fn get_referrers(&self, run_id: i64, target_url: &str) -> StorageResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT source_url FROM links WHERE run_id = ?1 AND target_url = ?2 ORDER BY id",
        )?;

        let referrers = stmt
            .query_map(params![run_id, target_url], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(referrers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{CrawlError, PageResult, ReferenceGraph};
    use chrono::Utc;
    use indexmap::IndexMap;

    fn page(url: &str, texts: &[&str], unique: &[&str]) -> PageResult {
        PageResult {
            url: url.to_string(),
            html: "<p>body</p>".to_string(),
            size: 11,
            title: "Title".to_string(),
            texts: texts.iter().map(|t| t.to_string()).collect(),
            unique_texts: unique.iter().map(|t| t.to_string()).collect(),
            headers: IndexMap::from([("Content-Type".to_string(), "text/html".to_string())]),
            links: Vec::new(),
            loading_time: 3.5,
            http_code: 200,
            redirect_target: None,
        }
    }

    fn report() -> CrawlReport {
        let mut urls = IndexMap::new();
        urls.insert(
            "http://a.example/".to_string(),
            page(
                "http://a.example/",
                &["shared footer text here now", "first page prose goes here"],
                &["shared footer text here now", "first page prose goes here"],
            ),
        );
        urls.insert(
            "http://a.example/b".to_string(),
            page(
                "http://a.example/b",
                &["shared footer text here now", "second page prose goes here"],
                &["second page prose goes here"],
            ),
        );

        let mut references = ReferenceGraph::new();
        references
            .entry("http://a.example/".to_string())
            .or_default()
            .extend(["http://a.example/b".to_string(), "http://b.example/".to_string()]);
        references
            .entry("http://a.example/b".to_string())
            .or_default()
            .insert("http://b.example/".to_string());

        let now = Utc::now();
        CrawlReport {
            all_urls: vec![
                "http://a.example/".to_string(),
                "http://a.example/b".to_string(),
                "http://b.example/".to_string(),
            ],
            followed_urls: vec![
                "http://a.example/".to_string(),
                "http://a.example/b".to_string(),
            ],
            opened_urls: urls.keys().cloned().collect(),
            url_references: references,
            urls,
            errors: vec![CrawlError {
                url: "http://a.example/c".to_string(),
                message: "connection refused".to_string(),
                context: vec!["os error 111".to_string()],
            }],
            robots: None,
            status: CrawlState::Done,
            started_at: now,
            finished_at: now,
        }
    }

    #[test]
    fn test_create_in_memory() {
        let storage = SqliteStorage::new_in_memory();
        assert!(storage.is_ok());
    }

    #[test]
    fn test_save_report_counts() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let run_id = storage.save_report(&report(), "http://a.example/", "abc123").unwrap();

        assert_eq!(storage.count_pages(run_id).unwrap(), 2);
        assert_eq!(storage.count_links(run_id).unwrap(), 3);
        assert_eq!(storage.count_errors(run_id).unwrap(), 1);
    }

    #[test]
    fn test_get_run() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let run_id = storage.save_report(&report(), "http://a.example/", "abc123").unwrap();

        let run = storage.get_run(run_id).unwrap();
        assert_eq!(run.seed_url, "http://a.example/");
        assert_eq!(run.config_hash, "abc123");
        assert_eq!(run.status, CrawlState::Done);
        assert!(!run.robots_found);
    }

    #[test]
    fn test_get_missing_run() {
        let storage = SqliteStorage::new_in_memory().unwrap();
        assert!(matches!(
            storage.get_run(42),
            Err(StorageError::RunNotFound(42))
        ));
    }

    #[test]
    fn test_latest_run() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        assert!(storage.get_latest_run().unwrap().is_none());

        storage.save_report(&report(), "http://a.example/", "first").unwrap();
        let second = storage.save_report(&report(), "http://a.example/", "second").unwrap();

        let latest = storage.get_latest_run().unwrap().unwrap();
        assert_eq!(latest.id, second);
        assert_eq!(latest.config_hash, "second");
    }

    #[test]
    fn test_runs_are_isolated() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let first = storage.save_report(&report(), "http://a.example/", "h").unwrap();
        let second = storage.save_report(&report(), "http://a.example/", "h").unwrap();

        assert_eq!(storage.count_pages(first).unwrap(), 2);
        assert_eq!(storage.count_pages(second).unwrap(), 2);
    }

    #[test]
    fn test_unique_texts_in_crawl_order() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let run_id = storage.save_report(&report(), "http://a.example/", "h").unwrap();

        assert_eq!(
            storage.get_unique_texts(run_id).unwrap(),
            vec![
                "shared footer text here now".to_string(),
                "first page prose goes here".to_string(),
                "second page prose goes here".to_string(),
            ]
        );
    }

    #[test]
    fn test_referrers() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let run_id = storage.save_report(&report(), "http://a.example/", "h").unwrap();

        assert_eq!(
            storage.get_referrers(run_id, "http://b.example/").unwrap(),
            vec!["http://a.example/".to_string(), "http://a.example/b".to_string()]
        );
    }

    #[test]
    fn test_unique_flags_mark_first_occurrence() {
        let texts: Vec<String> = ["a", "b", "a", "c"].iter().map(|s| s.to_string()).collect();
        let unique: Vec<String> = ["a", "c"].iter().map(|s| s.to_string()).collect();
        assert_eq!(unique_flags(&texts, &unique), vec![true, false, false, true]);
    }

    #[test]
    fn test_file_database_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db").join("sweep.db");

        let run_id = {
            let mut storage = SqliteStorage::new(&path).unwrap();
            storage.save_report(&report(), "http://a.example/", "h").unwrap()
        };

        let storage = SqliteStorage::new(&path).unwrap();
        assert_eq!(storage.count_pages(run_id).unwrap(), 2);
    }
}
