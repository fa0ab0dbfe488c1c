use std::net::Ipv4Addr;

/// Returns true if the host is an IPv4 or IPv6 literal
pub fn is_ip_host(host: &str) -> bool {
    host.contains(':') || host.parse::<Ipv4Addr>().is_ok()
}

/// Counts the dot-separated labels of a host
///
/// IP literals count as a single label.
pub fn host_label_count(host: &str) -> usize {
    if is_ip_host(host) {
        return 1;
    }
    host.split('.').filter(|label| !label.is_empty()).count().max(1)
}

/// Extracts the trailing `depth` labels of a host
///
/// Two hosts belong to the same site when their registrable domains are
/// equal. IP literals are returned whole.
///
/// # Arguments
///
/// * `host` - The host to reduce (case-insensitive)
/// * `depth` - How many trailing labels to keep; `0` keeps the whole host
///
/// # Returns
///
/// The lowercase trailing labels joined by `.`
///
/// # Examples
///
/// ```
/// use sumi_sweep::url::registrable_domain;
///
/// assert_eq!(registrable_domain("blog.Example.com", 2), "example.com");
/// assert_eq!(registrable_domain("example.com", 3), "example.com");
/// assert_eq!(registrable_domain("127.0.0.1", 2), "127.0.0.1");
/// ```
pub fn registrable_domain(host: &str, depth: usize) -> String {
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    if depth == 0 || is_ip_host(&host) {
        return host;
    }

    let labels: Vec<&str> = host.split('.').collect();
    let start = labels.len().saturating_sub(depth);
    labels[start..].join(".")
}
