//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `PageState`: Tracks the state of individual pages (claimed, processed, failed, etc.)
//! - `FrontierStore`: The concurrency-safe set of URLs claimed during one crawl

mod frontier;
mod page_state;

// Re-export main types
pub use frontier::FrontierStore;
pub use page_state::PageState;
