//! Sumi-Sweep: a bounded breadth-first site sweeper
//!
//! This crate crawls a website from a seed URL, follows links breadth-first
//! within allow/deny filters and request/time budgets, and produces a
//! structured report of visited pages, extracted prose, the link graph and
//! any per-page failures.

pub mod config;
pub mod crawler;
pub mod output;
pub mod robots;
pub mod state;
pub mod storage;
pub mod text;
pub mod url;

use thiserror::Error;

/// Main error type for Sumi-Sweep operations
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] crawler::FetchError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid URL pattern: {0}")]
    InvalidPattern(String),
}

/// Reasons a reference cannot be turned into an absolute URL
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("Reference does not match the URI grammar: {0}")]
    Unparseable(String),

    #[error("Base URL must carry a scheme and a host: {0}")]
    InvalidBase(String),
}

/// Result type alias for Sumi-Sweep operations
pub type Result<T> = std::result::Result<T, SweepError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL resolution
pub type ResolveResult<T> = std::result::Result<T, ResolutionError>;

// Re-export commonly used types
pub use config::{Config, CrawlConfig};
pub use crawler::{CrawlEngine, FetchResponse, Fetcher, HttpFetcher};
pub use output::{CrawlReport, PageResult};
pub use state::CrawlState;
pub use text::TextExtractor;
pub use crate::url::{resolve, UrlParts};
