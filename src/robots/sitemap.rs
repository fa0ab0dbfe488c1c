//! Sitemap `<loc>` scanning
//!
//! Works on any textual body, so a sitemap index pointing at further
//! sitemaps is followed the same way as a plain URL set.

use crate::url::is_http_url;
use regex::Regex;
use std::sync::OnceLock;

static LOC_ELEMENT: OnceLock<Regex> = OnceLock::new();

/// Extracts absolute `http`/`https` URLs from `<loc>` elements
///
/// Entries that are not well-formed URLs are skipped. Order is preserved
/// and duplicates are kept; the frontier suppresses them.
///
/// # Examples
///
/// ```
/// use sumi_sweep::robots::extract_sitemap_locs;
///
/// let xml = "<urlset><url><loc>https://example.com/a</loc></url></urlset>";
/// assert_eq!(extract_sitemap_locs(xml), vec!["https://example.com/a".to_string()]);
/// ```
pub fn extract_sitemap_locs(body: &str) -> Vec<String> {
    let pattern = LOC_ELEMENT.get_or_init(|| {
        Regex::new(r"<loc>(?P<url>https?://[^\s<]+)</loc>").expect("loc pattern is a valid regex")
    });

    pattern
        .captures_iter(body)
        .filter_map(|caps| caps.name("url").map(|m| m.as_str()))
        .filter(|url| is_http_url(url))
        .map(str::to_string)
        .collect()
}
