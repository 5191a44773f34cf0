/// Page state definitions for tracking crawl progress
///
/// This module defines all possible states a claimed page can be in during a crawl.
use std::fmt;

/// Represents the current state of a page in the crawl process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageState {
    // ===== Active States =====
    /// Page has been claimed in the frontier and is awaiting (or undergoing) fetch
    Claimed,

    // ===== Terminal Success States =====
    /// Page was successfully fetched and its links were considered
    Processed,

    // ===== Terminal Error States =====
    /// Page returned HTTP 404 or 410 (permanent failure)
    DeadLink,

    /// Page could not be reached (connection refused, DNS failure, timeout)
    Unreachable,

    /// Page fetch failed for other reasons (bad status, unreadable body, etc.)
    Failed,
}

impl PageState {
    /// Maps a non-success HTTP status code to the state it leaves the page in
    pub fn from_status(status_code: u16) -> Self {
        match status_code {
            404 | 410 => Self::DeadLink,
            _ => Self::Failed,
        }
    }

    /// Returns true if this is a terminal state (no further processing needed)
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Claimed)
    }

    /// Returns true if this represents a successful completion
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Processed)
    }

    /// Returns true if this represents an error state
    pub fn is_error(&self) -> bool {
        matches!(self, Self::DeadLink | Self::Unreachable | Self::Failed)
    }

    /// Short lowercase label used in logs and summaries
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Claimed => "claimed",
            Self::Processed => "processed",
            Self::DeadLink => "dead_link",
            Self::Unreachable => "unreachable",
            Self::Failed => "failed",
        }
    }

    /// Returns all possible page states
    pub fn all_states() -> Vec<Self> {
        vec![
            Self::Claimed,
            Self::Processed,
            Self::DeadLink,
            Self::Unreachable,
            Self::Failed,
        ]
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
