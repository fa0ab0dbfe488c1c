//! Robots.txt parser implementation
//!
//! Only `Sitemap:` directives are read; access rules are kept verbatim in
//! the report but never enforced.

use regex::Regex;
use std::sync::OnceLock;

static SITEMAP_DIRECTIVE: OnceLock<Regex> = OnceLock::new();

/// Parsed robots.txt data
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedRobots {
    /// Robots.txt content as received (after text normalization)
    content: String,
    /// Absolute sitemap URLs in file order, each at most once
    sitemaps: Vec<String>,
}

impl ParsedRobots {
    /// Creates a new ParsedRobots from robots.txt content
    ///
    /// # Arguments
    ///
    /// * `content` - The robots.txt file content
    ///
    /// # Returns
    ///
    /// A ParsedRobots holding the content and its sitemap directives
    ///
    /// # Examples
    ///
    /// ```
    /// use sumi_sweep::robots::ParsedRobots;
    ///
    /// let robots = ParsedRobots::from_content(
    ///     "User-agent: *\nDisallow: /admin\nSitemap: https://example.com/sitemap.xml\n",
    /// );
    /// assert_eq!(robots.sitemaps(), ["https://example.com/sitemap.xml"]);
    /// ```
    pub fn from_content(content: &str) -> Self {
        Self {
            content: content.to_string(),
            sitemaps: sitemap_directives(content),
        }
    }

    /// Returns the robots.txt content
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns the sitemap URLs announced by the file
    pub fn sitemaps(&self) -> &[String] {
        &self.sitemaps
    }
}

/// Extracts the URLs of `Sitemap:` directives
///
/// Each line is trimmed first; the directive name is case-insensitive and
/// only absolute `http`/`https` targets are accepted.
pub fn sitemap_directives(content: &str) -> Vec<String> {
    let pattern = SITEMAP_DIRECTIVE.get_or_init(|| {
        Regex::new(r"^(?i:sitemap):\s*(?P<url>https?://\S+)")
            .expect("sitemap directive pattern is a valid regex")
    });

    let mut sitemaps: Vec<String> = Vec::new();
    for line in content.lines() {
        let Some(url) = pattern
            .captures(line.trim())
            .and_then(|caps| caps.name("url"))
            .map(|m| m.as_str().to_string())
        else {
            continue;
        };

        if !sitemaps.contains(&url) {
            sitemaps.push(url);
        }
    }
    sitemaps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_robots_txt() {
        let robots = ParsedRobots::from_content("");
        assert!(robots.sitemaps().is_empty());
        assert_eq!(robots.content(), "");
    }

    #[test]
    fn test_single_sitemap() {
        let robots = ParsedRobots::from_content(
            "User-agent: *\nDisallow:\n\nSitemap: https://example.com/sitemap.xml",
        );
        assert_eq!(robots.sitemaps(), ["https://example.com/sitemap.xml"]);
    }

    #[test]
    fn test_directive_is_case_insensitive() {
        let sitemaps = sitemap_directives(
            "sitemap: http://example.com/a.xml\nSITEMAP: http://example.com/b.xml\nSiteMap: http://example.com/c.xml",
        );
        assert_eq!(
            sitemaps,
            vec![
                "http://example.com/a.xml".to_string(),
                "http://example.com/b.xml".to_string(),
                "http://example.com/c.xml".to_string(),
            ]
        );
    }

    #[test]
    fn test_indented_directive_and_trailing_text() {
        let sitemaps = sitemap_directives("   Sitemap:   https://example.com/s.xml  # main\n");
        assert_eq!(sitemaps, vec!["https://example.com/s.xml".to_string()]);
    }

    #[test]
    fn test_relative_or_non_http_sitemaps_ignored() {
        let sitemaps = sitemap_directives("Sitemap: /sitemap.xml\nSitemap: ftp://example.com/s.xml");
        assert!(sitemaps.is_empty());
    }

    #[test]
    fn test_other_directives_ignored() {
        let sitemaps = sitemap_directives(
            "User-agent: *\nDisallow: /private\nCrawl-delay: 5\n# Sitemap: https://example.com/commented.xml",
        );
        assert!(sitemaps.is_empty());
    }

    #[test]
    fn test_duplicate_sitemaps_listed_once() {
        let sitemaps = sitemap_directives(
            "Sitemap: https://example.com/s.xml\nSitemap: https://example.com/s.xml",
        );
        assert_eq!(sitemaps.len(), 1);
    }
}
