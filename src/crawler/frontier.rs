//! The crawl frontier
//!
//! This module handles:
//! - The ordered queue of URLs to fetch (breadth-first insertion order)
//! - Duplicate suppression on enqueue
//! - The ledger of every URL observed, whether or not it was enqueued

use indexmap::IndexSet;

/// Ordered, duplicate-free queue of URLs plus the ledger of observed URLs
///
/// The frontier is never popped: the engine walks it by position, so the
/// queue doubles as the list of followed URLs in the final report.
#[derive(Debug, Clone, Default)]
pub struct Frontier {
    /// URLs accepted for fetching, in insertion order
    queue: IndexSet<String>,

    /// Every URL offered to the engine, in first-seen order
    discovered: IndexSet<String>,
}

impl Frontier {
    /// Creates an empty frontier
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a URL in the discovery ledger
    ///
    /// # Returns
    ///
    /// `true` if the URL had not been observed before
    pub fn record_discovered(&mut self, url: &str) -> bool {
        if self.discovered.contains(url) {
            return false;
        }
        self.discovered.insert(url.to_string())
    }

    /// Appends a URL to the queue unless it is already queued
    ///
    /// # Returns
    ///
    /// `true` if the URL was appended
    pub fn push(&mut self, url: &str) -> bool {
        if self.queue.contains(url) {
            return false;
        }
        self.queue.insert(url.to_string())
    }

    /// Returns true if the URL is already queued
    pub fn contains(&self, url: &str) -> bool {
        self.queue.contains(url)
    }

    /// Returns the URL at a queue position
    pub fn get(&self, position: usize) -> Option<&str> {
        self.queue.get_index(position).map(String::as_str)
    }

    /// Returns up to `max` consecutive URLs starting at `start`
    pub fn batch(&self, start: usize, max: usize) -> Vec<String> {
        (start..self.queue.len())
            .take(max)
            .filter_map(|i| self.queue.get_index(i).cloned())
            .collect()
    }

    /// Number of queued URLs
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns true if nothing is queued
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of URLs in the discovery ledger
    pub fn discovered_count(&self) -> usize {
        self.discovered.len()
    }

    /// Queued URLs in insertion order
    pub fn queued(&self) -> impl Iterator<Item = &str> {
        self.queue.iter().map(String::as_str)
    }

    /// Observed URLs in first-seen order
    pub fn discovered(&self) -> impl Iterator<Item = &str> {
        self.discovered.iter().map(String::as_str)
    }

    /// Consumes the frontier, returning `(discovered, queued)`
    pub fn into_parts(self) -> (Vec<String>, Vec<String>) {
        (
            self.discovered.into_iter().collect(),
            self.queue.into_iter().collect(),
        )
    }

    /// Removes every queued and discovered URL
    pub fn clear(&mut self) {
        self.queue.clear();
        self.discovered.clear();
    }
}
