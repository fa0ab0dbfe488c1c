//! Markdown summary generation
//!
//! This module generates human-readable markdown summaries of crawl results,
//! including statistics, the most linked pages and the error log.

use crate::output::report::CrawlReport;
use crate::output::stats::ReportStatistics;
use crate::SweepError;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Rows shown in each ranked table
const TOP_ROWS: usize = 20;

/// Writes a markdown summary of a crawl report
///
/// # Arguments
///
/// * `report` - The crawl report
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown summary
/// * `Err(SweepError)` - Failed to write summary
pub fn write_markdown_summary(report: &CrawlReport, output_path: &Path) -> Result<(), SweepError> {
    let markdown = format_markdown_summary(report);
    fs::write(output_path, markdown)?;

    tracing::info!(path = %output_path.display(), "Wrote markdown summary");
    Ok(())
}

/// Formats a crawl report as markdown
///
/// # Arguments
///
/// * `report` - The crawl report
///
/// # Returns
///
/// A formatted markdown string
pub fn format_markdown_summary(report: &CrawlReport) -> String {
    let stats = ReportStatistics::from_report(report);
    let mut md = String::new();

    md.push_str("# Sumi-Sweep Crawl Summary\n\n");

    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Started**: {}\n", report.started_at.to_rfc3339()));
    md.push_str(&format!("- **Finished**: {}\n", report.finished_at.to_rfc3339()));
    md.push_str(&format!(
        "- **Duration**: {:.1} seconds\n",
        stats.duration_seconds
    ));
    md.push_str(&format!("- **Status**: {}\n", report.status));
    md.push_str(&format!(
        "- **robots.txt**: {}\n\n",
        if report.robots.is_some() { "found" } else { "not found" }
    ));

    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!("- **Pages Recorded**: {}\n", stats.pages));
    md.push_str(&format!("- **URLs Discovered**: {}\n", stats.discovered));
    md.push_str(&format!("- **URLs Followed**: {}\n", stats.followed));
    md.push_str(&format!("- **Never Reached**: {}\n", stats.unvisited));
    md.push_str(&format!("- **Unique Hosts**: {}\n", stats.unique_hosts));
    md.push_str(&format!("- **Link Edges**: {}\n", stats.links));
    md.push_str(&format!("- **Unique Texts**: {}\n", stats.unique_texts));
    md.push_str(&format!("- **Errors**: {}\n", stats.errors));
    md.push_str(&format!(
        "- **Success Rate**: {:.2}%\n\n",
        stats.success_rate()
    ));

    if !stats.status_histogram.is_empty() {
        md.push_str("## HTTP Status Breakdown\n\n");
        md.push_str("| Status | Pages |\n");
        md.push_str("|--------|-------|\n");
        for (status, count) in &stats.status_histogram {
            md.push_str(&format!("| {} | {} |\n", status, count));
        }
        md.push('\n');
    }

    let redirects: Vec<_> = report
        .urls
        .values()
        .filter_map(|page| page.redirect_target.as_ref().map(|target| (&page.url, target)))
        .collect();
    if !redirects.is_empty() {
        md.push_str("## Redirects\n\n");
        md.push_str("| From | To |\n");
        md.push_str("|------|----|\n");
        for (from, to) in redirects.iter().take(TOP_ROWS) {
            md.push_str(&format!("| {} | {} |\n", from, to));
        }
        if redirects.len() > TOP_ROWS {
            md.push_str(&format!("\n... and {} more\n", redirects.len() - TOP_ROWS));
        }
        md.push('\n');
    }

    let most_linked = most_linked_urls(report);
    if !most_linked.is_empty() {
        md.push_str(&format!("## Top {} Linked URLs\n\n", TOP_ROWS));
        md.push_str("| URL | References |\n");
        md.push_str("|-----|------------|\n");
        for (url, count) in most_linked.iter().take(TOP_ROWS) {
            md.push_str(&format!("| {} | {} |\n", url, count));
        }
        md.push('\n');
    }

    if !report.errors.is_empty() {
        md.push_str("## Errors\n\n");
        md.push_str("| URL | Message |\n");
        md.push_str("|-----|---------|\n");
        for error in &report.errors {
            md.push_str(&format!(
                "| {} | {} |\n",
                error.url,
                error.message.replace('|', "\\|")
            ));
        }
        md.push('\n');
    }

    md
}

/// Link targets ordered by how many crawled pages reference them
fn most_linked_urls(report: &CrawlReport) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for targets in report.url_references.values() {
        for target in targets {
            *counts.entry(target.as_str()).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(url, count)| (url.to_string(), count))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{CrawlError, PageResult, ReferenceGraph};
    use crate::state::CrawlState;
    use chrono::Utc;
    use indexmap::IndexMap;

    fn create_test_report() -> CrawlReport {
        let mut urls = IndexMap::new();
        urls.insert(
            "https://example.com/".to_string(),
            PageResult {
                url: "https://example.com/".to_string(),
                html: String::new(),
                size: 10,
                title: "Home".to_string(),
                texts: Vec::new(),
                unique_texts: Vec::new(),
                headers: IndexMap::new(),
                links: Vec::new(),
                loading_time: 5.0,
                http_code: 200,
                redirect_target: None,
            },
        );
        urls.insert(
            "https://example.com/old".to_string(),
            PageResult {
                url: "https://example.com/old".to_string(),
                html: String::new(),
                size: 0,
                title: "https://example.com/new".to_string(),
                texts: Vec::new(),
                unique_texts: Vec::new(),
                headers: IndexMap::new(),
                links: Vec::new(),
                loading_time: 2.0,
                http_code: 301,
                redirect_target: Some("https://example.com/new".to_string()),
            },
        );

        let mut references = ReferenceGraph::new();
        references
            .entry("https://example.com/".to_string())
            .or_default()
            .extend([
                "https://example.com/old".to_string(),
                "https://example.com/about".to_string(),
            ]);
        references
            .entry("https://example.com/old".to_string())
            .or_default()
            .insert("https://example.com/about".to_string());

        let now = Utc::now();
        CrawlReport {
            all_urls: Vec::new(),
            followed_urls: Vec::new(),
            opened_urls: urls.keys().cloned().collect(),
            url_references: references,
            urls,
            errors: vec![CrawlError {
                url: "https://example.com/broken".to_string(),
                message: "a | b".to_string(),
                context: Vec::new(),
            }],
            robots: Some("User-agent: *".to_string()),
            status: CrawlState::Done,
            started_at: now,
            finished_at: now,
        }
    }

    #[test]
    fn test_format_markdown_summary() {
        let markdown = format_markdown_summary(&create_test_report());

        assert!(markdown.contains("# Sumi-Sweep Crawl Summary"));
        assert!(markdown.contains("Overall Statistics"));
        assert!(markdown.contains("- **Status**: done"));
        assert!(markdown.contains("- **robots.txt**: found"));
        assert!(markdown.contains("- **Pages Recorded**: 2"));
    }

    #[test]
    fn test_markdown_status_and_redirect_tables() {
        let markdown = format_markdown_summary(&create_test_report());

        assert!(markdown.contains("| 200 | 1 |"));
        assert!(markdown.contains("| 301 | 1 |"));
        assert!(markdown.contains("| https://example.com/old | https://example.com/new |"));
    }

    #[test]
    fn test_markdown_most_linked_first() {
        let markdown = format_markdown_summary(&create_test_report());
        let about = markdown.find("| https://example.com/about | 2 |").unwrap();
        let old = markdown.find("| https://example.com/old | 1 |").unwrap();
        assert!(about < old);
    }

    #[test]
    fn test_markdown_escapes_pipes_in_errors() {
        let markdown = format_markdown_summary(&create_test_report());
        assert!(markdown.contains("| https://example.com/broken | a \\| b |"));
    }

    #[test]
    fn test_write_markdown_summary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.md");

        write_markdown_summary(&create_test_report(), &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("# Sumi-Sweep Crawl Summary"));
    }
}
