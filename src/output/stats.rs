//! Statistics derived from a crawl report
//!
//! This module provides functionality for summarizing a finished crawl
//! and displaying the numbers on stdout.

use crate::output::report::CrawlReport;
use crate::url::UrlParts;
use std::collections::{BTreeMap, BTreeSet};

/// Crawl statistics summary
#[derive(Debug, Clone, PartialEq)]
pub struct ReportStatistics {
    /// Pages with a recorded result
    pub pages: usize,

    /// URLs observed, enqueued or not
    pub discovered: usize,

    /// URLs accepted into the frontier
    pub followed: usize,

    /// Frontier positions never reached
    pub unvisited: usize,

    /// Per-URL failures
    pub errors: usize,

    /// Link edges in the reference graph
    pub links: usize,

    /// Distinct hosts among the recorded pages
    pub unique_hosts: usize,

    /// Recorded pages by HTTP status
    pub status_histogram: BTreeMap<u16, usize>,

    /// Unique prose runs across the crawl
    pub unique_texts: usize,

    /// Sum of body sizes of the recorded pages (bytes)
    pub total_bytes: usize,

    /// Crawl duration (seconds)
    pub duration_seconds: f64,
}

impl ReportStatistics {
    /// Computes statistics from a report
    ///
    /// # Arguments
    ///
    /// * `report` - A finished crawl report
    ///
    /// # Returns
    ///
    /// The statistics for that report
    pub fn from_report(report: &CrawlReport) -> Self {
        let mut status_histogram = BTreeMap::new();
        let mut hosts = BTreeSet::new();

        for page in report.urls.values() {
            *status_histogram.entry(page.http_code).or_insert(0) += 1;

            if let Some(host) = UrlParts::parse(&page.url)
                .ok()
                .and_then(|parts| parts.host().map(str::to_string))
            {
                hosts.insert(host);
            }
        }

        // Every frontier position below the last fetched one was attempted
        let attempted = report.urls.len() + report.errors.len();

        Self {
            pages: report.urls.len(),
            discovered: report.all_urls.len(),
            followed: report.followed_urls.len(),
            unvisited: report.followed_urls.len().saturating_sub(attempted),
            errors: report.errors.len(),
            links: report.link_count(),
            unique_hosts: hosts.len(),
            status_histogram,
            unique_texts: report.urls.values().map(|p| p.unique_texts.len()).sum(),
            total_bytes: report.urls.values().map(|p| p.size).sum(),
            duration_seconds: report.duration_seconds(),
        }
    }

    /// Share of attempted fetches that produced a 2xx page, in percent
    pub fn success_rate(&self) -> f64 {
        let attempted = self.pages + self.errors;
        if attempted == 0 {
            return 0.0;
        }

        let successful: usize = self
            .status_histogram
            .iter()
            .filter(|(status, _)| (200..=299).contains(*status))
            .map(|(_, count)| count)
            .sum();

        (successful as f64 / attempted as f64) * 100.0
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &ReportStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Pages recorded: {}", stats.pages);
    println!("  URLs discovered: {}", stats.discovered);
    println!("  URLs followed: {}", stats.followed);
    println!("  Never reached: {}", stats.unvisited);
    println!("  Unique hosts: {}", stats.unique_hosts);
    println!("  Link edges: {}", stats.links);
    println!("  Unique texts: {}", stats.unique_texts);
    println!("  Bytes recorded: {}", stats.total_bytes);
    println!("  Duration: {:.1}s", stats.duration_seconds);
    println!();

    if !stats.status_histogram.is_empty() {
        println!("Pages by HTTP Status:");
        for (status, count) in &stats.status_histogram {
            let percentage = if stats.pages > 0 {
                (*count as f64 / stats.pages as f64) * 100.0
            } else {
                0.0
            };
            println!("  {}: {} ({:.1}%)", status, count, percentage);
        }
        println!();
    }

    if stats.errors > 0 {
        println!("Errors: {}", stats.errors);
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} pages, {} errors)",
        stats.success_rate(),
        stats.pages,
        stats.errors
    );
}
