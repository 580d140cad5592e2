/// Page state definitions for tracking crawl progress
///
/// A page moves `Unvisited -> InProgress -> {Visited, Failed}` exactly once per run.
use std::fmt;

/// Represents the current state of a page in the crawl process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageState {
    /// Page has not been touched in this run
    Unvisited,

    /// Page is being rendered, processed, and its resources downloaded
    InProgress,

    /// Page was rendered, rewritten, and written to disk
    Visited,

    /// Rendering or processing failed on every attempt
    Failed,
}

impl PageState {
    /// Returns true if this is a terminal state (no further processing needed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Visited | Self::Failed)
    }

    /// Returns true if this represents a successful completion
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Visited)
    }

    /// Returns true if the state machine allows moving from `self` to `next`
    pub fn can_transition_to(&self, next: PageState) -> bool {
        matches!(
            (self, next),
            (Self::Unvisited, Self::InProgress)
                | (Self::InProgress, Self::Visited)
                | (Self::InProgress, Self::Failed)
        )
    }

    /// Short lowercase label used in logs and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unvisited => "unvisited",
            Self::InProgress => "in_progress",
            Self::Visited => "visited",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
