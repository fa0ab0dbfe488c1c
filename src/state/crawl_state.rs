//! Crawl lifecycle states
//!
//! This module defines the states a crawl engine moves through during one
//! `crawl()` call.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents the current phase of a crawl
///
/// ```text
/// Idle -> Seeding -> Crawling -> Done
///                             \-> BudgetExceeded
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrawlState {
    // ===== Active States =====
    /// No crawl has started yet
    #[default]
    Idle,

    /// The seed, alternate scheme and robots.txt sitemaps are being enqueued
    Seeding,

    /// Frontier positions are being fetched and processed
    Crawling,

    // ===== Terminal States =====
    /// The frontier was exhausted within budget
    Done,

    /// The request count or wall-clock budget stopped the crawl early
    BudgetExceeded,
}

impl CrawlState {
    /// Returns true if this is a terminal state (the crawl has finished)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::BudgetExceeded)
    }

    /// Returns true if a crawl is in progress
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Seeding | Self::Crawling)
    }

    /// Returns true if moving to `next` follows the lifecycle
    ///
    /// Terminal states may restart at `Seeding` because an engine can be
    /// reused for another crawl.
    pub fn can_transition_to(&self, next: CrawlState) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Seeding)
                | (Self::Seeding, Self::Crawling)
                | (Self::Crawling, Self::Done)
                | (Self::Crawling, Self::BudgetExceeded)
                | (Self::Done, Self::Seeding)
                | (Self::BudgetExceeded, Self::Seeding)
        )
    }

    /// Converts the state to a database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Seeding => "seeding",
            Self::Crawling => "crawling",
            Self::Done => "done",
            Self::BudgetExceeded => "budget_exceeded",
        }
    }

    /// Parses a state from a database string representation
    ///
    /// Returns None if the string doesn't match any known state.
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "idle" => Some(Self::Idle),
            "seeding" => Some(Self::Seeding),
            "crawling" => Some(Self::Crawling),
            "done" => Some(Self::Done),
            "budget_exceeded" => Some(Self::BudgetExceeded),
            _ => None,
        }
    }
}

impl fmt::Display for CrawlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [CrawlState; 5] = [
        CrawlState::Idle,
        CrawlState::Seeding,
        CrawlState::Crawling,
        CrawlState::Done,
        CrawlState::BudgetExceeded,
    ];

    #[test]
    fn test_terminal_states() {
        assert!(CrawlState::Done.is_terminal());
        assert!(CrawlState::BudgetExceeded.is_terminal());
        assert!(!CrawlState::Idle.is_terminal());
        assert!(!CrawlState::Seeding.is_terminal());
        assert!(!CrawlState::Crawling.is_terminal());
    }

    #[test]
    fn test_active_states() {
        assert!(CrawlState::Seeding.is_active());
        assert!(CrawlState::Crawling.is_active());
        assert!(!CrawlState::Idle.is_active());
        assert!(!CrawlState::Done.is_active());
    }

    #[test]
    fn test_lifecycle_transitions() {
        assert!(CrawlState::Idle.can_transition_to(CrawlState::Seeding));
        assert!(CrawlState::Seeding.can_transition_to(CrawlState::Crawling));
        assert!(CrawlState::Crawling.can_transition_to(CrawlState::Done));
        assert!(CrawlState::Crawling.can_transition_to(CrawlState::BudgetExceeded));
        assert!(CrawlState::Done.can_transition_to(CrawlState::Seeding));

        assert!(!CrawlState::Idle.can_transition_to(CrawlState::Crawling));
        assert!(!CrawlState::Seeding.can_transition_to(CrawlState::Done));
        assert!(!CrawlState::Done.can_transition_to(CrawlState::BudgetExceeded));
    }

    #[test]
    fn test_db_string_roundtrip() {
        for state in ALL {
            assert_eq!(CrawlState::from_db_string(state.to_db_string()), Some(state));
        }
        assert_eq!(CrawlState::from_db_string("unknown"), None);
    }

    #[test]
    fn test_default_is_idle() {
        assert_eq!(CrawlState::default(), CrawlState::Idle);
    }

    #[test]
    fn test_serializes_as_snake_case() {
        let json = serde_json::to_string(&CrawlState::BudgetExceeded).unwrap();
        assert_eq!(json, "\"budget_exceeded\"");
    }
}
