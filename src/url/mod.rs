//! URL handling module for Sitewalk
//!
//! This module provides link normalization (resolving hrefs against the page
//! they were found on), seed validation, and the in-scope predicate.

mod normalize;
mod scope;

// Re-export main functions
pub use normalize::normalize_link;
pub use scope::{parse_seed, Scope};
