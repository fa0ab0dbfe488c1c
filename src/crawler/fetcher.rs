//! HTTP fetcher implementation
//!
//! This module handles all network access for the crawler, including:
//! - The `Fetcher` seam the engine fetches through
//! - Building HTTP clients with proper user agent strings
//! - Parsing raw HTTP messages into a `FetchResponse`
//! - Error classification

use crate::config::UserAgentConfig;
use crate::crawler::content::strip_control_characters;
use crate::url::UrlParts;
use async_trait::async_trait;
use regex::Regex;
use reqwest::{redirect::Policy, Client};
use std::sync::OnceLock;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Status used when a response carries no parseable status line
pub const FALLBACK_STATUS: u16 = 500;

static STATUS_LINE: OnceLock<Regex> = OnceLock::new();

/// Transport-level failure of a single fetch
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to {url} timed out")]
    Timeout { url: String },

    #[error("Could not connect to {url}: {message}")]
    Connect { url: String, message: String },

    #[error("Failed to read response body from {url}: {message}")]
    Body { url: String, message: String },

    #[error("Unsupported URL scheme: {url}")]
    Unsupported { url: String },
}

impl FetchError {
    /// The URL the failed request was made for
    pub fn url(&self) -> &str {
        match self {
            Self::Http { url, .. }
            | Self::Timeout { url }
            | Self::Connect { url, .. }
            | Self::Body { url, .. }
            | Self::Unsupported { url } => url,
        }
    }

    fn from_reqwest(url: &str, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else if error.is_connect() {
            Self::Connect {
                url: url.to_string(),
                message: error.to_string(),
            }
        } else {
            Self::Http {
                url: url.to_string(),
                source: error,
            }
        }
    }
}

/// A raw response as returned by a transport
#[derive(Debug, Clone, PartialEq)]
pub struct FetchResponse {
    /// HTTP status code
    pub status: u16,

    /// Header lines in wire order; duplicates are preserved
    pub headers: Vec<(String, String)>,

    /// Undecoded response body
    pub body: Vec<u8>,

    /// Time from sending the request to receiving the full body
    pub elapsed_ms: f64,
}

impl FetchResponse {
    /// Parses a raw HTTP message (status line, header block, blank line, body)
    ///
    /// The header block ends at the first blank line (`\r\n\r\n` or `\n\n`);
    /// without one the whole message is treated as headers. Header lines are
    /// read after line-ending normalization and control-character stripping,
    /// and lines without a `:` are ignored. A missing or malformed status
    /// line yields status 500.
    ///
    /// # Arguments
    ///
    /// * `raw` - The message bytes as received
    /// * `elapsed_ms` - Time the transport spent on the request
    ///
    /// # Examples
    ///
    /// ```
    /// use sumi_sweep::crawler::FetchResponse;
    ///
    /// let raw = b"HTTP/1.1 301 Moved Permanently\r\nLocation: /new\r\n\r\n";
    /// let response = FetchResponse::from_raw(raw, 12.5);
    /// assert_eq!(response.status, 301);
    /// assert_eq!(response.header("location"), Some("/new"));
    /// assert!(response.body.is_empty());
    /// ```
    pub fn from_raw(raw: &[u8], elapsed_ms: f64) -> Self {
        let (head, body) = split_message(raw);
        let head = String::from_utf8_lossy(head).replace("\r\n", "\n").replace('\r', "\n");

        let mut lines = head.lines();
        let status = lines
            .next()
            .and_then(parse_status_line)
            .unwrap_or(FALLBACK_STATUS);

        let headers = lines
            .filter_map(|line| {
                let line = strip_control_characters(line);
                let (name, value) = line.split_once(':')?;
                let name = name.trim();
                if name.is_empty() {
                    return None;
                }
                Some((name.to_string(), value.trim().to_string()))
            })
            .collect();

        Self {
            status,
            headers,
            body: body.to_vec(),
            elapsed_ms,
        }
    }

    /// Returns the first value of a header, compared case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns true for 3xx statuses
    pub fn is_redirect(&self) -> bool {
        (300..=399).contains(&self.status)
    }
}

fn split_message(raw: &[u8]) -> (&[u8], &[u8]) {
    let crlf = raw.windows(4).position(|w| w == b"\r\n\r\n").map(|i| (i, 4));
    let lf = raw.windows(2).position(|w| w == b"\n\n").map(|i| (i, 2));

    let boundary = match (crlf, lf) {
        (Some(a), Some(b)) => Some(if a.0 <= b.0 { a } else { b }),
        (a, b) => a.or(b),
    };

    match boundary {
        Some((idx, len)) => (&raw[..idx], &raw[idx + len..]),
        None => (raw, &[]),
    }
}

fn parse_status_line(line: &str) -> Option<u16> {
    let pattern = STATUS_LINE.get_or_init(|| {
        Regex::new(r"^\S+\s+(?P<code>\d{3})\b").expect("status line pattern is a valid regex")
    });
    pattern.captures(line)?.name("code")?.as_str().parse().ok()
}

/// The transport seam of the crawl engine
///
/// Implementations issue one request per call and report what came back,
/// without following redirects. A non-2xx status is a successful fetch;
/// only transport failures are errors.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches a single URL
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use sumi_sweep::config::UserAgentConfig;
/// use sumi_sweep::crawler::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "SumiSweep".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: Some("https://example.com/about".to_string()),
///     contact_email: Some("admin@example.com".to_string()),
/// };
///
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent())
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::none()) // Redirects are enqueued by the engine
        .gzip(true)
        .brotli(true)
        .build()
}

/// `Fetcher` backed by a reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher with a client built from the user agent configuration
    pub fn new(config: &UserAgentConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }

    /// Wraps an existing client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        let is_http = UrlParts::parse(url)
            .ok()
            .and_then(|parts| parts.scheme().map(|s| s == "http" || s == "https"))
            .unwrap_or(false);
        if !is_http {
            return Err(FetchError::Unsupported {
                url: url.to_string(),
            });
        }

        let started = Instant::now();

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();

        let body = response.bytes().await.map_err(|e| FetchError::Body {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        Ok(FetchResponse {
            status,
            headers,
            body: body.to_vec(),
            elapsed_ms: started.elapsed().as_secs_f64() * 1000.0,
        })
    }
}
