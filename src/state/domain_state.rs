/// Crawl state definitions for a single domain traversal
///
/// A domain moves through `NotStarted -> Traversing -> {Completed | Failed}`.
/// Both end states are terminal.
use std::fmt;

/// Represents where a domain is in its traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DomainCrawlState {
    /// Domain is known but no page has been requested yet
    NotStarted,

    /// Fetcher selected and pagination is being followed
    Traversing,

    /// Pagination ended; product URLs are final
    Completed,

    /// An unrecoverable error ended the traversal; no results are reported
    Failed,
}

impl DomainCrawlState {
    /// Returns true if no further transitions are allowed
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Returns true if `next` is a legal successor of this state
    pub fn can_transition_to(&self, next: DomainCrawlState) -> bool {
        matches!(
            (self, next),
            (Self::NotStarted, Self::Traversing)
                | (Self::NotStarted, Self::Failed)
                | (Self::Traversing, Self::Completed)
                | (Self::Traversing, Self::Failed)
        )
    }

    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::NotStarted => "not_started",
            Self::Traversing => "traversing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "not_started" => Some(Self::NotStarted),
            "traversing" => Some(Self::Traversing),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    /// Returns all possible domain states
    pub fn all_states() -> Vec<Self> {
        vec![
            Self::NotStarted,
            Self::Traversing,
            Self::Completed,
            Self::Failed,
        ]
    }
}

impl fmt::Display for DomainCrawlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}
