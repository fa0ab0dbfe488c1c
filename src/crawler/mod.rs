//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - The `Fetcher` transport seam and its reqwest-backed implementation
//! - Response header and body normalization
//! - HTML scanning for links and titles
//! - The enqueue filter policy and the frontier
//! - Overall crawl coordination

mod content;
mod coordinator;
mod fetcher;
mod filter;
mod frontier;
mod parser;

pub use content::{
    binary_placeholder, decode_body, format_html, header_value, is_textual_media_type,
    media_type, normalize_headers, normalize_text, strip_control_characters, HeaderMap, PageBody,
};
pub use coordinator::CrawlEngine;
pub use fetcher::{build_http_client, FetchError, FetchResponse, Fetcher, HttpFetcher, FALLBACK_STATUS};
pub use filter::{FilterDecision, FilterPolicy};
pub use frontier::Frontier;
pub use parser::{extract_links, extract_title, parse_html, ParsedPage};

use crate::config::{CrawlConfig, UserAgentConfig};
use crate::output::CrawlReport;
use crate::SweepError;

/// Runs a complete crawl over HTTP
///
/// This is the main entry point for a one-off crawl. It will:
/// 1. Build an HTTP fetcher from the user agent configuration
/// 2. Validate the crawl configuration
/// 3. Crawl from the seed and any extra start URLs
///
/// # Arguments
///
/// * `config` - The crawl configuration
/// * `user_agent` - The user agent configuration
/// * `seed` - Absolute URL the crawl starts from
/// * `extra` - Additional start URLs
///
/// # Returns
///
/// * `Ok(CrawlReport)` - The crawl ran (individual page failures are in the report)
/// * `Err(SweepError)` - The client could not be built or the configuration is invalid
pub async fn crawl(
    config: CrawlConfig,
    user_agent: &UserAgentConfig,
    seed: &str,
    extra: &[String],
) -> Result<CrawlReport, SweepError> {
    let fetcher = HttpFetcher::new(user_agent).map_err(|e| SweepError::Fetch(FetchError::Http {
        url: seed.to_string(),
        source: e,
    }))?;

    let mut engine = CrawlEngine::new(config, fetcher)?;
    Ok(engine.crawl_with_urls(seed, extra).await)
}
