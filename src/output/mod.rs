//! Output module for reporting crawl results
//!
//! This module handles:
//! - Printing a summary of the crawl to stdout
//! - Writing a markdown summary file

mod markdown;
pub mod stats;

pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use stats::{print_summary, success_rate};
