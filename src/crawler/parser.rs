//! HTML scanning for links and metadata
//!
//! This module handles scanning HTML content to extract:
//! - Links to follow (from `<a>` tags)
//! - Page title
//!
//! Scanning is pattern based; markup is never parsed into a tree.

use crate::url::resolve;
use indexmap::IndexSet;
use regex::Regex;
use std::sync::OnceLock;

/// Schemes whose links are never followed
const SKIPPED_SCHEMES: &[&str] = &["mailto:", "tel:", "phone:", "javascript:", "data:"];

static ANCHOR_TAG: OnceLock<Regex> = OnceLock::new();
static HREF_ATTRIBUTE: OnceLock<Regex> = OnceLock::new();
static TITLE_ELEMENT: OnceLock<Regex> = OnceLock::new();

/// Extracted information from an HTML page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPage {
    /// The page title (from the first <title> element)
    pub title: Option<String>,

    /// Distinct absolute link targets in first-seen order
    pub links: Vec<String>,
}

/// Scans HTML content for its title and links
///
/// # Arguments
///
/// * `html` - The formatted page content
/// * `page_url` - Absolute URL of the page, used to resolve relative links
///
/// # Example
///
/// ```
/// use sumi_sweep::crawler::parse_html;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let parsed = parse_html(html, "https://example.com/");
/// assert_eq!(parsed.title, Some("Test".to_string()));
/// assert_eq!(parsed.links, vec!["https://example.com/page".to_string()]);
/// ```
pub fn parse_html(html: &str, page_url: &str) -> ParsedPage {
    ParsedPage {
        title: extract_title(html),
        links: extract_links(page_url, html),
    }
}

/// Extracts the trimmed text of the first `<title>` element
///
/// Returns `None` when there is no title or it is blank.
pub fn extract_title(html: &str) -> Option<String> {
    let pattern = TITLE_ELEMENT.get_or_init(|| {
        Regex::new(r"(?i)<title[^>]*>(?P<title>[^<]+)</title>").expect("title pattern is a valid regex")
    });

    pattern
        .captures(html)
        .and_then(|caps| caps.name("title"))
        .map(|m| m.as_str().trim().to_string())
        .filter(|title| !title.is_empty())
}

/// Extracts the absolute targets of every anchor in a page
///
/// # Extraction Rules
///
/// 1. Find each `<a ...>` opening tag and its quoted `href` value
/// 2. Skip `mailto:`, `tel:`, `phone:`, `javascript:` and `data:` targets
/// 3. Resolve the value against `page_url`; values that do not resolve
///    are dropped
/// 4. Keep the first occurrence of each resolved URL
///
/// # Arguments
///
/// * `page_url` - Absolute URL of the page
/// * `html` - The page content
///
/// # Returns
///
/// Absolute URLs in first-seen order, each at most once
pub fn extract_links(page_url: &str, html: &str) -> Vec<String> {
    let anchors = ANCHOR_TAG
        .get_or_init(|| Regex::new(r"(?i)<a[^>]+>").expect("anchor pattern is a valid regex"));
    let hrefs = HREF_ATTRIBUTE.get_or_init(|| {
        Regex::new(r#"(?i)href=['"](?P<url>[^'"]+)['"]"#).expect("href pattern is a valid regex")
    });

    let mut links = IndexSet::new();

    for tag in anchors.find_iter(html) {
        let Some(href) = hrefs
            .captures(tag.as_str())
            .and_then(|caps| caps.name("url"))
            .map(|m| m.as_str().trim())
        else {
            continue;
        };

        if is_skipped_scheme(href) {
            tracing::trace!(page = page_url, href, "Skipping non-navigational link");
            continue;
        }

        match resolve(page_url, href) {
            Ok(absolute) => {
                links.insert(absolute);
            }
            Err(e) => {
                tracing::trace!(page = page_url, href, error = %e, "Dropping unresolvable link");
            }
        }
    }

    links.into_iter().collect()
}

fn is_skipped_scheme(href: &str) -> bool {
    let lowered = href.to_ascii_lowercase();
    SKIPPED_SCHEMES.iter().any(|scheme| lowered.starts_with(scheme))
}
