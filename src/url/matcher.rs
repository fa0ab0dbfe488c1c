use regex::Regex;
use std::sync::OnceLock;

static HTTP_URL: OnceLock<Regex> = OnceLock::new();

/// Compiles a pattern that must match a candidate in its entirety
///
/// The pattern is wrapped as `^(?:pattern)$`, so `https://example\.com/.*`
/// matches every URL on that host but not `https://example.com.evil/`.
///
/// # Arguments
///
/// * `pattern` - A regular expression in `regex` crate syntax
///
/// # Returns
///
/// * `Ok(Regex)` - The anchored expression
/// * `Err(regex::Error)` - The pattern does not compile
pub fn compile_full_match(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("^(?:{})$", pattern))
}

/// Returns true if any of the compiled patterns matches the candidate
pub fn matches_any(patterns: &[Regex], candidate: &str) -> bool {
    patterns.iter().any(|pattern| pattern.is_match(candidate))
}

/// Checks that a string is an absolute `http`/`https` URL with a plausible host
///
/// Accepts domain names (including internationalized labels), dotted IPv4
/// and bracketed IPv6 hosts, an optional port and an optional path that
/// contains no whitespace.
///
/// # Examples
///
/// ```
/// use sumi_sweep::url::is_http_url;
///
/// assert!(is_http_url("https://example.com/sitemap.xml"));
/// assert!(is_http_url("http://127.0.0.1:8080/"));
/// assert!(!is_http_url("ftp://example.com/"));
/// assert!(!is_http_url("https://exa mple.com/"));
/// ```
pub fn is_http_url(value: &str) -> bool {
    let pattern = HTTP_URL.get_or_init(|| {
        let alpha = r"a-zA-Z[^\x00-\x7F]";
        let alnum = r"0-9a-zA-Z[^\x00-\x7F]";
        let domain = format!(
            r"(?:(?:[\-_{alnum}]+\.)*[{alnum}](?:[\-{alnum}]{{0,61}}[{alnum}])?\.)?[{alpha}](?:[\-{alnum}]{{0,17}}[{alpha}])?",
            alnum = alnum,
            alpha = alpha,
        );
        let pattern = format!(
            r"^https?://(?:{domain}|\d{{1,3}}\.\d{{1,3}}\.\d{{1,3}}\.\d{{1,3}}|\[[0-9a-fA-F:]{{3,39}}\])(?::\d{{1,5}})?(?:/\S*)?$",
            domain = domain,
        );
        Regex::new(&pattern).expect("HTTP URL pattern is a valid regex")
    });
    pattern.is_match(value)
}
