use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
// Use the interfaces crate for core types
pub use interfaces::defs::{ExternalId, FeedItem, NewRelevantItem, Notifier, Verdict};

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub max_feed_size_mb: usize,
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "arxiv-triage/0.1".to_string(),
            timeout_seconds: 15,
            max_feed_size_mb: 10,
            max_redirects: 5,
        }
    }
}

/// Terminal state of a single feed item within one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOutcome {
    Skipped,
    CachedRelevant,
    ClassifiedRelevant,
    ClassifiedNotRelevant,
}

impl ItemOutcome {
    pub fn is_relevant(self) -> bool {
        matches!(self, ItemOutcome::CachedRelevant | ItemOutcome::ClassifiedRelevant)
    }
}

/// A relevant item as it will appear in the console report.
#[derive(Debug, Clone)]
pub struct RelevantEntry {
    pub date: NaiveDate,
    pub item: FeedItem,
    pub newly_classified: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopicSummary {
    pub topic: String,
    pub retrieved: usize,
    pub in_window: usize,
    pub relevant: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    pub topics: Vec<TopicSummary>,
    pub retrieved: usize,
    pub in_window: usize,
    pub skipped: usize,
    pub cache_hits: usize,
    pub classifier_calls: usize,
    pub classifier_failures: usize,
    pub relevant: usize,
    pub new_relevant: usize,
}

/// Inclusive `[start, end]` publication window, fixed once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Everything a finished run hands to the reporter and the notifier.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub window: TimeWindow,
    pub stats: RunStats,
    pub relevant: Vec<RelevantEntry>,
    pub new_items: Vec<NewRelevantItem>,
}

#[derive(Debug, thiserror::Error)]
pub enum TriageError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Feed parse error: {0}")]
    Parse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Feed size exceeds limit: {size_mb}MB")]
    FeedTooLarge { size_mb: usize },

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, TriageError>;
