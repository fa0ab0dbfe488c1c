//! URL handling module for Sumi-Sweep
//!
//! This module provides:
//! - `UrlParts`, an immutable decomposition of a URI reference
//! - RFC 3986 reference resolution with dot-segment removal
//! - Percent-encoding normalization per URI component
//! - Host reduction to a registrable domain for the same-site check
//! - Anchored pattern matching for allow/deny lists

mod domain;
mod matcher;
mod normalize;
mod parts;
mod resolve;

pub use domain::{host_label_count, is_ip_host, registrable_domain};
pub use matcher::{compile_full_match, is_http_url, matches_any};
pub use normalize::{normalize_component, remove_dot_segments, strip_fragment, Component};
pub use parts::UrlParts;
pub use resolve::resolve;

use crate::ResolveResult;

/// Returns `scheme://authority/`, the root of the site a URL belongs to
///
/// # Returns
///
/// * `Some(String)` - The site root when the URL is absolute
/// * `None` - The URL is unparseable or has no scheme/host
///
/// # Examples
///
/// ```
/// use sumi_sweep::url::site_root;
///
/// assert_eq!(
///     site_root("https://example.com:8443/a/b?c").as_deref(),
///     Some("https://example.com:8443/")
/// );
/// assert_eq!(site_root("/relative"), None);
/// ```
pub fn site_root(url: &str) -> Option<String> {
    let parts = UrlParts::parse(url).ok()?;
    if !parts.is_absolute() {
        return None;
    }
    Some(format!("{}://{}/", parts.scheme()?, parts.authority()))
}

/// Returns the canonical absolute form of a URL
///
/// Applies the same normalization as [`resolve`] and gives a URL with a
/// host but an empty path the root path `/`, so `http://a.example` and
/// `http://a.example/` name the same page.
///
/// # Returns
///
/// * `Ok(String)` - The canonical URL
/// * `Err(ResolutionError)` - The input is unparseable or relative
///
/// # Examples
///
/// ```
/// use sumi_sweep::url::canonicalize;
///
/// assert_eq!(canonicalize("HTTP://Example.COM").unwrap(), "http://example.com/");
/// assert_eq!(canonicalize("http://a.example/x/../%7euser").unwrap(), "http://a.example/~user");
/// ```
pub fn canonicalize(url: &str) -> ResolveResult<String> {
    let resolved = resolve(url, url)?;
    let parts = UrlParts::parse(&resolved)?;

    if parts.host().is_some_and(|h| !h.is_empty()) && parts.path().is_empty() {
        return Ok(parts.with_path("/").to_string());
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonicalize() {
        assert_eq!(
            canonicalize("http://a.example?q=1#top").unwrap(),
            "http://a.example/?q=1#top"
        );
        assert_eq!(
            canonicalize("https://a.example/b/./c/").unwrap(),
            "https://a.example/b/c/"
        );
        assert!(canonicalize("/relative").is_err());
        assert!(canonicalize("has space").is_err());
    }

    #[test]
    fn test_canonicalize_is_idempotent() {
        for url in [
            "http://%41.example/",
            "HTTP://%57ww.Example.COM:8080/%7euser/./a/../b?Q=%2f#Frag",
            "http://a%c3%a9.example",
        ] {
            let once = canonicalize(url).unwrap();
            assert_eq!(canonicalize(&once).unwrap(), once, "input: {}", url);
        }
        assert_eq!(canonicalize("http://%41.example/").unwrap(), "http://a.example/");
    }

    #[test]
    fn test_site_root() {
        assert_eq!(
            site_root("http://example.com/x/y").as_deref(),
            Some("http://example.com/")
        );
        assert_eq!(
            site_root("http://127.0.0.1:4000").as_deref(),
            Some("http://127.0.0.1:4000/")
        );
    }

    #[test]
    fn test_site_root_requires_absolute_url() {
        assert_eq!(site_root("//example.com/x"), None);
        assert_eq!(site_root("not a url"), None);
    }
}
