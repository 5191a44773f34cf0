//! Markdown summary generation
//!
//! This module generates human-readable markdown summaries of crawl results.

use crate::crawler::CrawlReport;
use crate::output::stats::success_rate;
use chrono::{DateTime, Utc};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes a markdown summary of the crawl to `output_path`
///
/// # Arguments
///
/// * `report` - The finished crawl
/// * `output_path` - Path where the markdown file should be written
pub fn generate_markdown_summary(report: &CrawlReport, output_path: &Path) -> std::io::Result<()> {
    let markdown = format_markdown_summary(report, Utc::now());

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a crawl report as markdown
pub fn format_markdown_summary(report: &CrawlReport, generated_at: DateTime<Utc>) -> String {
    let mut md = String::new();

    md.push_str("# Sitewalk Crawl Summary\n\n");

    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Seed**: {}\n", report.seed));
    md.push_str(&format!("- **Generated**: {}\n", generated_at.to_rfc3339()));
    md.push_str(&format!(
        "- **Duration**: {:.2} seconds\n",
        report.elapsed.as_secs_f64()
    ));
    let status = if report.completed {
        "completed"
    } else {
        "cancelled"
    };
    md.push_str(&format!("- **Status**: {}\n\n", status));

    md.push_str("## Overall Statistics\n\n");
    md.push_str("| Metric | Count |\n");
    md.push_str("|--------|-------|\n");
    md.push_str(&format!("| Visited | {} |\n", report.visited.len()));
    md.push_str(&format!("| Processed | {} |\n", report.pages_processed));
    md.push_str(&format!("| Failed | {} |\n\n", report.pages_failed));
    md.push_str(&format!(
        "- **Success Rate**: {:.2}%\n\n",
        success_rate(report)
    ));

    md.push_str("## Visited Links\n\n");
    if report.visited.is_empty() {
        md.push_str("_None_\n");
    }
    for link in &report.visited {
        md.push_str(&format!("- <{}>\n", link));
    }

    md
}
