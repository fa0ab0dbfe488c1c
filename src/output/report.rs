//! The crawl report and its parts
//!
//! A report is assembled by the engine during one crawl and returned when
//! the crawl reaches a terminal state. Its serde form is the JSON export.

use crate::state::CrawlState;
use crate::SweepError;
use chrono::{DateTime, Utc};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fs;
use std::path::Path;

/// Directed link edges: source page URL to the set of URLs it links to
pub type ReferenceGraph = IndexMap<String, IndexSet<String>>;

/// Result of one fetched frontier position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResult {
    /// Canonical absolute URL of the page
    pub url: String,

    /// Normalized body, or a placeholder for binary content
    pub html: String,

    /// Body size in bytes
    pub size: usize,

    /// Page title; the resolved redirect target for 3xx responses, the URL when absent
    pub title: String,

    /// Every prose run on the page
    pub texts: Vec<String>,

    /// Prose runs not seen earlier in the session
    #[serde(rename = "uniqueTexts")]
    pub unique_texts: Vec<String>,

    /// Response headers, one value per name
    pub headers: IndexMap<String, String>,

    /// Outbound link targets in first-seen order
    pub links: Vec<String>,

    /// Fetch duration (milliseconds)
    #[serde(rename = "loadingTime")]
    pub loading_time: f64,

    /// HTTP status code
    #[serde(rename = "httpCode")]
    pub http_code: u16,

    /// Resolved `Location` of a redirect response
    #[serde(
        rename = "redirectTarget",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub redirect_target: Option<String>,
}

impl PageResult {
    /// Returns true if the page answered with a 3xx status
    pub fn is_redirect(&self) -> bool {
        (300..=399).contains(&self.http_code)
    }
}

/// A per-URL failure recorded during a crawl
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlError {
    /// The URL whose processing failed
    pub url: String,

    /// Top-level error message
    pub message: String,

    /// Messages of the underlying causes, outermost first
    #[serde(rename = "trace")]
    pub context: Vec<String>,
}

impl CrawlError {
    /// Captures an error and its `source()` chain
    pub fn from_error(url: &str, error: &(dyn StdError + 'static)) -> Self {
        let mut context = Vec::new();
        let mut source = error.source();
        while let Some(cause) = source {
            context.push(cause.to_string());
            source = cause.source();
        }

        Self {
            url: url.to_string(),
            message: error.to_string(),
            context,
        }
    }
}

/// Everything a crawl produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlReport {
    /// Every URL observed, enqueued or not, in first-seen order
    #[serde(rename = "allUrls")]
    pub all_urls: Vec<String>,

    /// The frontier: URLs accepted for fetching, in crawl order
    #[serde(rename = "followedUrls")]
    pub followed_urls: Vec<String>,

    /// URLs with a recorded page result
    #[serde(rename = "openedUrls")]
    pub opened_urls: Vec<String>,

    /// Link graph of the crawled pages
    #[serde(rename = "urlReferences")]
    pub url_references: ReferenceGraph,

    /// Page results keyed by canonical URL
    pub urls: IndexMap<String, PageResult>,

    /// Per-URL failures
    pub errors: Vec<CrawlError>,

    /// Normalized robots.txt body, if it answered 200
    pub robots: Option<String>,

    /// Terminal state of the crawl
    pub status: CrawlState,

    #[serde(rename = "startedAt")]
    pub started_at: DateTime<Utc>,

    #[serde(rename = "finishedAt")]
    pub finished_at: DateTime<Utc>,
}

impl CrawlReport {
    /// Number of recorded pages
    pub fn page_count(&self) -> usize {
        self.urls.len()
    }

    /// Total number of link edges in the reference graph
    pub fn link_count(&self) -> usize {
        self.url_references.values().map(IndexSet::len).sum()
    }

    /// Returns true if the crawl stopped on its request or time budget
    pub fn budget_exceeded(&self) -> bool {
        self.status == CrawlState::BudgetExceeded
    }

    /// Wall-clock duration of the crawl in seconds
    pub fn duration_seconds(&self) -> f64 {
        (self.finished_at - self.started_at).num_milliseconds() as f64 / 1000.0
    }

    /// Converts the report into a JSON value
    ///
    /// # Returns
    ///
    /// * `Ok(serde_json::Value)` - The structural export
    /// * `Err(SweepError)` - Serialization failed
    pub fn to_json_value(&self) -> Result<serde_json::Value, SweepError> {
        Ok(serde_json::to_value(self)?)
    }

    /// Writes the report as pretty-printed JSON
    ///
    /// # Arguments
    ///
    /// * `path` - Destination file; parent directories are created
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The file was written
    /// * `Err(SweepError)` - Serialization or I/O failed
    pub fn write_json(&self, path: &Path) -> Result<(), SweepError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;

        tracing::info!(path = %path.display(), "Wrote JSON report");
        Ok(())
    }
}
