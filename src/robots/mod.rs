//! Robots.txt and sitemap handling module
//!
//! This module reads sitemap hints: `Sitemap:` directives in robots.txt and
//! `<loc>` entries in sitemap documents. Robots.txt access rules are not
//! enforced.

mod parser;
mod sitemap;

pub use parser::{sitemap_directives, ParsedRobots};
pub use sitemap::extract_sitemap_locs;

use crate::url::site_root;

/// Returns the robots.txt URL of the site a URL belongs to
///
/// # Arguments
///
/// * `url` - Any absolute URL on the site
///
/// # Returns
///
/// * `Some(String)` - `{scheme}://{authority}/robots.txt`
/// * `None` - The URL is not absolute
///
/// # Examples
///
/// ```
/// use sumi_sweep::robots::robots_url;
///
/// assert_eq!(
///     robots_url("https://example.com/blog/post?x=1").as_deref(),
///     Some("https://example.com/robots.txt")
/// );
/// ```
pub fn robots_url(url: &str) -> Option<String> {
    site_root(url).map(|root| format!("{}robots.txt", root))
}
