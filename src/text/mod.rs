//! Prose extraction for Sumi-Sweep
//!
//! This module pulls paragraph-like text runs out of raw HTML with a
//! word-run heuristic and deduplicates them across a crawl session by
//! their ASCII slug.

mod extractor;
mod slug;

pub use extractor::{ExtractedTexts, TextExtractor};
pub use slug::slugify;
