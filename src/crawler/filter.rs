//! Enqueue policy for candidate URLs
//!
//! A candidate is checked, in order, against the same-site rule, the allow
//! list and the deny list. Duplicate suppression is left to the frontier.

use crate::config::{validate_crawl_config, CrawlConfig};
use crate::url::{compile_full_match, host_label_count, matches_any, registrable_domain, UrlParts};
use crate::{ConfigError, ConfigResult};
use regex::Regex;
use std::fmt;

/// Outcome of checking a candidate URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterDecision {
    /// The URL may be enqueued
    Accept,
    /// Its registrable domain differs from the seed's
    External,
    /// No allow pattern matches it
    NotAllowed,
    /// A deny pattern matches it
    Forbidden,
}

impl FilterDecision {
    /// Returns true if the URL may be enqueued
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accept)
    }
}

impl fmt::Display for FilterDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::Accept => "accepted",
            Self::External => "external link",
            Self::NotAllowed => "no allow pattern matches",
            Self::Forbidden => "matches a forbidden pattern",
        };
        f.write_str(reason)
    }
}

/// Compiled allow/deny rules plus the same-site rule
#[derive(Debug, Clone)]
pub struct FilterPolicy {
    follow_external_links: bool,
    configured_depth: Option<usize>,
    allowed: Vec<Regex>,
    forbidden: Vec<Regex>,
    /// Registrable domain of the seed and the label depth it was taken at
    site: Option<(String, usize)>,
}

impl FilterPolicy {
    /// Compiles the policy from a crawl configuration
    ///
    /// # Returns
    ///
    /// * `Ok(FilterPolicy)` - Every pattern compiled
    /// * `Err(ConfigError)` - The configuration is invalid
    pub fn new(config: &CrawlConfig) -> ConfigResult<Self> {
        validate_crawl_config(config)?;

        Ok(Self {
            follow_external_links: config.follow_external_links,
            configured_depth: config.domain_depth,
            allowed: compile_all(&config.allowed_url_patterns)?,
            forbidden: compile_all(&config.forbidden_url_patterns)?,
            site: None,
        })
    }

    /// Anchors the same-site rule to the seed URL
    ///
    /// The comparison depth is the configured `domain-depth`, or the number
    /// of labels in the seed host. A seed without a host makes every later
    /// URL external.
    pub fn set_seed(&mut self, seed: &str) {
        self.site = seed_host(seed).map(|host| {
            let depth = self
                .configured_depth
                .unwrap_or_else(|| host_label_count(&host));
            (registrable_domain(&host, depth), depth)
        });
    }

    /// Registrable domain the same-site rule compares against
    pub fn site_domain(&self) -> Option<&str> {
        self.site.as_ref().map(|(domain, _)| domain.as_str())
    }

    /// Checks a fragment-free candidate URL
    ///
    /// # Rules
    ///
    /// 1. Unless external links are followed, the URL's registrable domain
    ///    must equal the seed's
    /// 2. At least one allow pattern must match the whole URL
    /// 3. No deny pattern may match the whole URL
    pub fn check(&self, url: &str) -> FilterDecision {
        if !self.follow_external_links && self.is_external(url) {
            return FilterDecision::External;
        }

        if !matches_any(&self.allowed, url) {
            return FilterDecision::NotAllowed;
        }

        if matches_any(&self.forbidden, url) {
            return FilterDecision::Forbidden;
        }

        FilterDecision::Accept
    }

    /// Returns true if the URL's registrable domain differs from the seed's
    pub fn is_external(&self, url: &str) -> bool {
        let Some((site, depth)) = &self.site else {
            return true;
        };

        match seed_host(url) {
            Some(host) => registrable_domain(&host, *depth) != *site,
            None => true,
        }
    }
}

fn seed_host(url: &str) -> Option<String> {
    UrlParts::parse(url)
        .ok()
        .and_then(|parts| parts.host().map(str::to_string))
        .filter(|host| !host.is_empty())
}

fn compile_all(patterns: &[String]) -> ConfigResult<Vec<Regex>> {
    patterns
        .iter()
        .map(|pattern| {
            compile_full_match(pattern)
                .map_err(|e| ConfigError::InvalidPattern(format!("'{}': {}", pattern, e)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(config: CrawlConfig, seed: &str) -> FilterPolicy {
        let mut policy = FilterPolicy::new(&config).unwrap();
        policy.set_seed(seed);
        policy
    }

    #[test]
    fn test_default_policy_accepts_same_site() {
        let policy = policy(CrawlConfig::default(), "http://a.example/");
        assert_eq!(policy.check("http://a.example/page"), FilterDecision::Accept);
        assert_eq!(policy.site_domain(), Some("a.example"));
    }

    #[test]
    fn test_external_links_rejected_by_default() {
        let policy = policy(CrawlConfig::default(), "http://a.example/");
        assert_eq!(policy.check("http://b.example/x"), FilterDecision::External);
    }

    #[test]
    fn test_external_links_followed_when_enabled() {
        let config = CrawlConfig {
            follow_external_links: true,
            ..Default::default()
        };
        let policy = policy(config, "http://a.example/");
        assert_eq!(policy.check("http://b.example/x"), FilterDecision::Accept);
    }

    #[test]
    fn test_subdomain_is_external_at_seed_depth() {
        let policy = policy(CrawlConfig::default(), "https://www.example.com/");
        assert_eq!(
            policy.check("https://blog.example.com/"),
            FilterDecision::External
        );
        assert_eq!(
            policy.check("https://WWW.EXAMPLE.COM/about"),
            FilterDecision::Accept
        );
    }

    #[test]
    fn test_configured_depth_widens_site() {
        let config = CrawlConfig {
            domain_depth: Some(2),
            ..Default::default()
        };
        let policy = policy(config, "https://www.example.com/");
        assert_eq!(policy.check("https://blog.example.com/"), FilterDecision::Accept);
        assert_eq!(policy.check("https://example.org/"), FilterDecision::External);
    }

    #[test]
    fn test_scheme_and_port_do_not_make_a_url_external() {
        let policy = policy(CrawlConfig::default(), "http://a.example/");
        assert_eq!(policy.check("https://a.example:8443/"), FilterDecision::Accept);
    }

    #[test]
    fn test_hostless_urls_are_external() {
        let policy = policy(CrawlConfig::default(), "http://a.example/");
        assert_eq!(policy.check("mailto:x@a.example"), FilterDecision::External);
        assert_eq!(policy.check("not a url"), FilterDecision::External);
    }

    #[test]
    fn test_allow_patterns_are_full_matches() {
        let config = CrawlConfig {
            allowed_url_patterns: vec![r"http://a\.example/docs/.*".to_string()],
            ..Default::default()
        };
        let policy = policy(config, "http://a.example/");
        assert_eq!(
            policy.check("http://a.example/docs/intro"),
            FilterDecision::Accept
        );
        assert_eq!(
            policy.check("http://a.example/blog/docs/x"),
            FilterDecision::NotAllowed
        );
    }

    #[test]
    fn test_forbidden_patterns() {
        let config = CrawlConfig {
            forbidden_url_patterns: vec![r".*\.pdf".to_string(), r".*/admin/.*".to_string()],
            ..Default::default()
        };
        let policy = policy(config, "http://a.example/");
        assert_eq!(
            policy.check("http://a.example/file.pdf"),
            FilterDecision::Forbidden
        );
        assert_eq!(
            policy.check("http://a.example/admin/users"),
            FilterDecision::Forbidden
        );
        assert_eq!(
            policy.check("http://a.example/file.pdf.html"),
            FilterDecision::Accept
        );
    }

    #[test]
    fn test_rules_short_circuit_in_order() {
        let config = CrawlConfig {
            allowed_url_patterns: vec![r"http://a\.example/.*".to_string()],
            forbidden_url_patterns: vec![".*".to_string()],
            ..Default::default()
        };
        let policy = policy(config, "http://a.example/");
        assert_eq!(policy.check("http://b.example/"), FilterDecision::External);
        assert_eq!(
            policy.check("http://a.example/x"),
            FilterDecision::Forbidden
        );
    }

    #[test]
    fn test_ip_seed_compares_whole_host() {
        let policy = policy(CrawlConfig::default(), "http://127.0.0.1:8080/");
        assert_eq!(policy.check("http://127.0.0.1:8080/a"), FilterDecision::Accept);
        assert_eq!(policy.check("http://127.0.0.2/"), FilterDecision::External);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = CrawlConfig {
            allowed_url_patterns: Vec::new(),
            ..Default::default()
        };
        assert!(FilterPolicy::new(&config).is_err());
    }

    #[test]
    fn test_decision_display() {
        assert_eq!(FilterDecision::External.to_string(), "external link");
        assert!(FilterDecision::Accept.is_accepted());
        assert!(!FilterDecision::Forbidden.is_accepted());
    }
}
