//! Crawl engine - main crawl orchestration logic
//!
//! This module contains the crawl loop that turns a seed URL into a bounded
//! breadth-first traversal, including:
//! - Seeding the frontier (seed, alternate scheme, extra URLs, robots.txt sitemaps)
//! - Walking the frontier strictly in insertion order
//! - Enforcing the request-count and wall-clock budgets
//! - Turning each response into a page result, new frontier entries and link edges
//! - Recording per-URL failures without aborting the crawl

use crate::config::CrawlConfig;
use crate::crawler::content::{decode_body, format_html, header_value, normalize_headers, normalize_text};
use crate::crawler::fetcher::{FetchError, FetchResponse, Fetcher};
use crate::crawler::filter::FilterPolicy;
use crate::crawler::frontier::Frontier;
use crate::crawler::parser::parse_html;
use crate::output::{CrawlError, CrawlReport, PageResult, ReferenceGraph};
use crate::robots::{extract_sitemap_locs, robots_url, ParsedRobots};
use crate::state::CrawlState;
use crate::text::TextExtractor;
use crate::url::{canonicalize, is_http_url, resolve, site_root, strip_fragment, UrlParts};
use crate::ConfigResult;
use chrono::Utc;
use futures::future::join_all;
use indexmap::IndexMap;
use std::time::{Duration, Instant};

/// Breadth-first crawl engine
///
/// The engine owns every collection a crawl builds. They are rebuilt at the
/// start of each [`crawl`](CrawlEngine::crawl); only the text extractor's
/// fingerprints survive from one crawl to the next, so a reused engine
/// reports boilerplate as unique only once across all its crawls. Call
/// [`reset`](CrawlEngine::reset) or inject a fresh extractor to isolate runs.
pub struct CrawlEngine<F: Fetcher> {
    config: CrawlConfig,
    policy: FilterPolicy,
    fetcher: F,
    texts: TextExtractor,
    state: CrawlState,

    // ===== Per-crawl state =====
    frontier: Frontier,
    references: ReferenceGraph,
    pages: IndexMap<String, PageResult>,
    errors: Vec<CrawlError>,
    robots: Option<String>,
}

impl<F: Fetcher> CrawlEngine<F> {
    /// Creates a new engine
    ///
    /// # Arguments
    ///
    /// * `config` - The crawl configuration
    /// * `fetcher` - Transport used for every request
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlEngine)` - The configuration is valid and its patterns compiled
    /// * `Err(ConfigError)` - The configuration is invalid
    pub fn new(config: CrawlConfig, fetcher: F) -> ConfigResult<Self> {
        let policy = FilterPolicy::new(&config)?;

        Ok(Self {
            config,
            policy,
            fetcher,
            texts: TextExtractor::new(),
            state: CrawlState::Idle,
            frontier: Frontier::new(),
            references: ReferenceGraph::new(),
            pages: IndexMap::new(),
            errors: Vec::new(),
            robots: None,
        })
    }

    /// Replaces the text extractor, and with it the set of seen fingerprints
    pub fn with_text_extractor(mut self, texts: TextExtractor) -> Self {
        self.texts = texts;
        self
    }

    /// Current lifecycle state
    pub fn state(&self) -> CrawlState {
        self.state
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn text_extractor(&self) -> &TextExtractor {
        &self.texts
    }

    /// Forgets every per-crawl collection and every seen text fingerprint
    pub fn reset(&mut self) {
        self.clear_crawl_state();
        self.texts.reset();
        self.state = CrawlState::Idle;
    }

    /// Crawls from a seed URL
    ///
    /// Never fails: fetch failures are recorded in the report's errors and
    /// the crawl ends in [`CrawlState::Done`] or [`CrawlState::BudgetExceeded`].
    pub async fn crawl(&mut self, seed: &str) -> CrawlReport {
        self.crawl_with_urls(seed, &[]).await
    }

    /// Crawls from a seed URL with additional start URLs
    ///
    /// # Arguments
    ///
    /// * `seed` - Absolute URL the crawl starts from; it anchors the same-site rule
    /// * `extra` - Further start URLs, absolute or relative to the seed's site root
    ///
    /// # Returns
    ///
    /// The report of everything accumulated until the crawl stopped
    pub async fn crawl_with_urls(&mut self, seed: &str, extra: &[String]) -> CrawlReport {
        let started_at = Utc::now();

        self.clear_crawl_state();
        self.transition(CrawlState::Seeding);
        self.seed(seed, extra).await;

        self.transition(CrawlState::Crawling);
        let outcome = self.run_loop().await;
        self.transition(outcome);

        let report = self.finish(started_at);
        tracing::info!(
            status = %report.status,
            pages = report.urls.len(),
            followed = report.followed_urls.len(),
            discovered = report.all_urls.len(),
            errors = report.errors.len(),
            "Crawl finished"
        );
        report
    }

    async fn seed(&mut self, seed: &str, extra: &[String]) {
        let canonical_seed = match canonicalize(seed) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(seed, error = %e, "Seed URL is not an absolute URL");
                self.frontier.record_discovered(seed);
                self.errors.push(CrawlError::from_error(seed, &e));
                return;
            }
        };

        tracing::info!(seed = %canonical_seed, "Seeding crawl");
        self.policy.set_seed(&canonical_seed);
        self.frontier.record_discovered(seed);
        self.add_url(&canonical_seed);

        if self.config.probe_alternate_scheme {
            if let Some(alternate) = alternate_scheme(&canonical_seed) {
                self.add_url(&alternate);
            }
        }

        if let Some(root) = site_root(&canonical_seed) {
            for url in extra {
                let trimmed = url.trim_start_matches('/');
                if is_http_url(trimmed) {
                    self.add_url(trimmed);
                    continue;
                }
                match resolve(&root, trimmed) {
                    Ok(absolute) => {
                        self.add_url(&absolute);
                    }
                    Err(e) => {
                        tracing::debug!(url, error = %e, "Skipping unresolvable start URL");
                    }
                }
            }
        }

        if self.config.fetch_robots_txt {
            if let Some(robots) = robots_url(&canonical_seed) {
                self.process_robots(&robots).await;
            }
        }
    }

    async fn process_robots(&mut self, url: &str) {
        self.pause().await;

        let response = match self.fetcher.fetch(url).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(url, error = %e, "Failed to fetch robots.txt");
                self.errors.push(CrawlError::from_error(url, &e));
                return;
            }
        };

        if response.status != 200 {
            tracing::debug!(url, status = response.status, "No robots.txt");
            return;
        }

        let robots = ParsedRobots::from_content(&normalize_text(&String::from_utf8_lossy(
            &response.body,
        )));
        tracing::info!(url, sitemaps = robots.sitemaps().len(), "Found robots.txt");

        self.add_url(url);
        for sitemap in robots.sitemaps() {
            self.add_url(sitemap);
        }
        self.robots = Some(robots.content().to_string());
    }

    async fn run_loop(&mut self) -> CrawlState {
        let started = Instant::now();
        let time_budget = Duration::from_secs(self.config.max_crawl_seconds);
        let mut position = 0;

        loop {
            if position >= self.frontier.len() {
                return CrawlState::Done;
            }
            if position >= self.config.max_requests || started.elapsed() >= time_budget {
                tracing::info!(
                    position,
                    queued = self.frontier.len(),
                    elapsed_secs = started.elapsed().as_secs(),
                    "Crawl budget exhausted"
                );
                return CrawlState::BudgetExceeded;
            }

            let batch_size = self
                .config
                .max_concurrent_requests
                .min(self.config.max_requests - position);
            let batch = self.frontier.batch(position, batch_size);
            let results = self.fetch_batch(&batch).await;

            for (url, result) in batch.iter().zip(results) {
                match result {
                    Ok(response) => self.record_page(url, response),
                    Err(e) => self.record_error(url, e),
                }
            }

            position += batch.len();
        }
    }

    /// Fetches consecutive frontier positions concurrently
    ///
    /// Results come back in the order of `urls`. Nothing is enqueued here;
    /// the caller processes the results one by one.
    async fn fetch_batch(&self, urls: &[String]) -> Vec<Result<FetchResponse, FetchError>> {
        self.pause().await;
        for url in urls {
            tracing::debug!(url = %url, "Fetching");
        }
        join_all(urls.iter().map(|url| self.fetcher.fetch(url))).await
    }

    async fn pause(&self) {
        if self.config.sleep_between_requests_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.sleep_between_requests_ms)).await;
        }
    }

    fn record_error(&mut self, url: &str, error: FetchError) {
        tracing::warn!(url, error = %error, "Fetch failed");
        self.errors.push(CrawlError::from_error(url, &error));
    }

    fn record_page(&mut self, url: &str, response: FetchResponse) {
        tracing::debug!(
            url,
            status = response.status,
            elapsed_ms = response.elapsed_ms,
            "Fetched"
        );

        let headers = normalize_headers(&response.headers);
        let body = decode_body(url, &response, &headers);

        if body.is_text {
            for loc in extract_sitemap_locs(&body.content) {
                self.add_url(&loc);
            }
        }

        let html = format_html(&body.content);
        let parsed = parse_html(&html, url);
        for link in &parsed.links {
            self.add_url(link);
            self.add_reference(url, link);
        }

        let texts = self.texts.extract(&html);

        let mut title = parsed.title.unwrap_or_else(|| url.to_string());
        let mut redirect_target = None;
        if response.is_redirect() {
            if let Some(location) = header_value(&headers, "location") {
                match resolve(url, location) {
                    Ok(target) => {
                        self.add_url(&target);
                        title = target.clone();
                        redirect_target = Some(target);
                    }
                    Err(e) => {
                        tracing::debug!(url, location, error = %e, "Unresolvable redirect target");
                    }
                }
            }
        }

        let key = canonicalize(url).unwrap_or_else(|_| url.to_string());
        self.pages.insert(
            key.clone(),
            PageResult {
                url: key,
                html,
                size: body.size,
                title,
                texts: texts.regular,
                unique_texts: texts.unique,
                headers,
                links: parsed.links,
                loading_time: response.elapsed_ms,
                http_code: response.status,
                redirect_target,
            },
        );
    }

    /// Offers a URL to the frontier
    ///
    /// The URL is always recorded as discovered. Its fragment-free canonical
    /// form is enqueued if the filter policy accepts it and it is not queued
    /// yet.
    ///
    /// # Returns
    ///
    /// `true` if the URL was appended to the frontier
    fn add_url(&mut self, url: &str) -> bool {
        self.frontier.record_discovered(url);

        let candidate = match canonicalize(strip_fragment(url)) {
            Ok(candidate) => candidate,
            Err(e) => {
                tracing::trace!(url, error = %e, "Not enqueuing unparseable URL");
                return false;
            }
        };

        let decision = self.policy.check(&candidate);
        if !decision.is_accepted() {
            tracing::trace!(url = %candidate, reason = %decision, "URL filtered");
            return false;
        }

        let added = self.frontier.push(&candidate);
        if added {
            tracing::debug!(url = %candidate, position = self.frontier.len() - 1, "Enqueued");
        }
        added
    }

    fn add_reference(&mut self, source: &str, target: &str) {
        self.references
            .entry(source.to_string())
            .or_default()
            .insert(target.to_string());
    }

    fn transition(&mut self, next: CrawlState) {
        if !self.state.can_transition_to(next) {
            tracing::warn!(from = %self.state, to = %next, "Unexpected crawl state transition");
        }
        tracing::trace!(from = %self.state, to = %next, "Crawl state transition");
        self.state = next;
    }

    fn clear_crawl_state(&mut self) {
        self.frontier.clear();
        self.references.clear();
        self.pages.clear();
        self.errors.clear();
        self.robots = None;
    }

    fn finish(&mut self, started_at: chrono::DateTime<Utc>) -> CrawlReport {
        let (all_urls, followed_urls) = std::mem::take(&mut self.frontier).into_parts();
        let pages = std::mem::take(&mut self.pages);

        CrawlReport {
            all_urls,
            followed_urls,
            opened_urls: pages.keys().cloned().collect(),
            url_references: std::mem::take(&mut self.references),
            urls: pages,
            errors: std::mem::take(&mut self.errors),
            robots: self.robots.take(),
            status: self.state,
            started_at,
            finished_at: Utc::now(),
        }
    }
}

/// The same URL with its scheme flipped between http and https
fn alternate_scheme(url: &str) -> Option<String> {
    let parts = UrlParts::parse(url).ok()?;
    let flipped = match parts.scheme()? {
        "http" => "https",
        "https" => "http",
        _ => return None,
    };
    Some(parts.with_scheme(Some(flipped)).to_string())
}
