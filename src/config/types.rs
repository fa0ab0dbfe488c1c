use serde::Deserialize;

/// Main configuration structure for Sumi-Sweep
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

/// Crawl behavior configuration
///
/// Every field has a default, so an empty `[crawler]` table yields a crawl
/// that stays on the seed's site, sleeps one second between requests and
/// stops after thirty seconds.
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlConfig {
    /// Follow links whose registrable domain differs from the seed's
    #[serde(rename = "follow-external-links", default)]
    pub follow_external_links: bool,

    /// Pause before every request (milliseconds)
    #[serde(rename = "sleep-between-requests-ms", default = "default_sleep_ms")]
    pub sleep_between_requests_ms: u64,

    /// Maximum number of frontier positions fetched in one crawl
    #[serde(rename = "max-requests", default = "default_max_requests")]
    pub max_requests: usize,

    /// Wall-clock budget for the crawl loop (seconds)
    #[serde(rename = "max-crawl-seconds", default = "default_max_crawl_seconds")]
    pub max_crawl_seconds: u64,

    /// Patterns a URL must fully match to be enqueued (at least one)
    #[serde(rename = "allowed-url-patterns", default = "default_allowed_patterns")]
    pub allowed_url_patterns: Vec<String>,

    /// Patterns that exclude a URL when fully matched
    #[serde(rename = "forbidden-url-patterns", default)]
    pub forbidden_url_patterns: Vec<String>,

    /// Labels compared by the same-site check; the seed host's label count when absent
    #[serde(rename = "domain-depth", default)]
    pub domain_depth: Option<usize>,

    /// Fetch `/robots.txt` during seeding to discover sitemaps
    #[serde(rename = "fetch-robots-txt", default = "default_true")]
    pub fetch_robots_txt: bool,

    /// Also enqueue the seed with its scheme flipped between http and https
    #[serde(rename = "probe-alternate-scheme", default)]
    pub probe_alternate_scheme: bool,

    /// Number of frontier positions fetched concurrently
    #[serde(rename = "max-concurrent-requests", default = "default_concurrency")]
    pub max_concurrent_requests: usize,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            follow_external_links: false,
            sleep_between_requests_ms: default_sleep_ms(),
            max_requests: default_max_requests(),
            max_crawl_seconds: default_max_crawl_seconds(),
            allowed_url_patterns: default_allowed_patterns(),
            forbidden_url_patterns: Vec::new(),
            domain_depth: None,
            fetch_robots_txt: true,
            probe_alternate_scheme: false,
            max_concurrent_requests: default_concurrency(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name", default = "default_crawler_name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version", default = "default_crawler_version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url", default)]
    pub contact_url: Option<String>,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email", default)]
    pub contact_email: Option<String>,
}

impl UserAgentConfig {
    /// Formats the `User-Agent` header value
    ///
    /// `Name/Version (+ContactURL; ContactEmail)`, with the parenthesized part
    /// reduced to whatever contact details are configured.
    pub fn user_agent(&self) -> String {
        let mut agent = format!("{}/{}", self.crawler_name, self.crawler_version);

        let contact: Vec<String> = self
            .contact_url
            .iter()
            .map(|url| format!("+{}", url))
            .chain(self.contact_email.iter().cloned())
            .collect();

        if !contact.is_empty() {
            agent.push_str(&format!(" ({})", contact.join("; ")));
        }
        agent
    }
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: default_crawler_name(),
            crawler_version: default_crawler_version(),
            contact_url: None,
            contact_email: None,
        }
    }
}

/// Output configuration
///
/// Each destination is optional; the binary writes to every configured one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Path to the JSON report file
    #[serde(rename = "json-path", default)]
    pub json_path: Option<String>,

    /// Path to the SQLite database file
    #[serde(rename = "database-path", default)]
    pub database_path: Option<String>,

    /// Path to the markdown summary file
    #[serde(rename = "summary-path", default)]
    pub summary_path: Option<String>,
}

impl OutputConfig {
    /// Returns true if no destination is configured
    pub fn is_empty(&self) -> bool {
        self.json_path.is_none() && self.database_path.is_none() && self.summary_path.is_none()
    }
}

fn default_sleep_ms() -> u64 {
    1000
}

fn default_max_requests() -> usize {
    1_000_000
}

fn default_max_crawl_seconds() -> u64 {
    30
}

fn default_allowed_patterns() -> Vec<String> {
    vec![".+".to_string()]
}

fn default_true() -> bool {
    true
}

fn default_concurrency() -> usize {
    1
}

fn default_crawler_name() -> String {
    "SumiSweep".to_string()
}

fn default_crawler_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
