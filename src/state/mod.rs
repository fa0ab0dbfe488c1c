//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlState`: The lifecycle phase of a crawl engine (idle, seeding, crawling, finished)

mod crawl_state;

pub use crawl_state::CrawlState;
