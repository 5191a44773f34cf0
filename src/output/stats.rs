//! Console statistics for a finished crawl

use crate::crawler::CrawlReport;

/// Percentage of visited pages that were processed successfully
pub fn success_rate(report: &CrawlReport) -> f64 {
    let attempted = report.pages_processed + report.pages_failed;
    if attempted == 0 {
        return 0.0;
    }
    (report.pages_processed as f64 / attempted as f64) * 100.0
}

/// Prints the crawl result to stdout in a formatted manner
///
/// # Arguments
///
/// * `report` - The report to display
/// * `list_links` - Also print every visited URL
pub fn print_summary(report: &CrawlReport, list_links: bool) {
    println!("=== Crawl Summary ===\n");

    println!("Overview:");
    println!("  Seed: {}", report.seed);
    println!("  Visited links: {}", report.visited.len());
    println!("  Pages processed: {}", report.pages_processed);
    println!("  Pages failed: {}", report.pages_failed);
    println!("  Elapsed: {:.2}s", report.elapsed.as_secs_f64());
    if !report.completed {
        println!("  Status: cancelled before completion");
    }
    println!();

    if list_links && !report.visited.is_empty() {
        println!("Visited Links:");
        for link in &report.visited {
            println!("  {}", link);
        }
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} / {} pages successfully processed)",
        success_rate(report),
        report.pages_processed,
        report.pages_processed + report.pages_failed
    );
}
