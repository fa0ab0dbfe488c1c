//! Output module for crawl reports and summaries
//!
//! This module handles:
//! - The `CrawlReport` returned by every crawl, and its JSON export
//! - Generating markdown summaries of crawl results
//! - Computing and printing crawl statistics

mod markdown;
mod report;
pub mod stats;

pub use markdown::{format_markdown_summary, write_markdown_summary};
pub use report::{CrawlError, CrawlReport, PageResult, ReferenceGraph};
pub use stats::{print_statistics, ReportStatistics};
