use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One candidate publication as decoded from the feed.
///
/// Every field the feed may omit is an explicit `Option`; callers use the
/// named helpers below instead of probing for presence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedItem {
    pub title: String,
    pub authors: Vec<String>,
    pub summary: String,
    pub published: Option<DateTime<Utc>>,
    pub link: Option<String>,
    pub raw_id: Option<String>,
}

impl FeedItem {
    pub fn published_date(&self) -> Option<NaiveDate> {
        self.published.map(|ts| ts.date_naive())
    }

    /// Permalink for display; empty when the feed carried none.
    pub fn permalink(&self) -> &str {
        self.link.as_deref().unwrap_or("")
    }
}

/// Normalized short identifier (e.g. `2401.12345`) used as the dedup key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExternalId(String);

impl ExternalId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A relevance decision plus the normalized token it was derived from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub relevant: bool,
    pub answer: String,
}

impl Verdict {
    pub fn relevant(answer: impl Into<String>) -> Self {
        Self { relevant: true, answer: answer.into() }
    }

    pub fn not_relevant(answer: impl Into<String>) -> Self {
        Self { relevant: false, answer: answer.into() }
    }
}

/// An item classified relevant during the current run.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRelevantItem {
    pub item: FeedItem,
    pub external_id: Option<ExternalId>,
}

// Object style note:
// Notifiers are invoked once at the very end of a short lived batch run,
// from a single task. They are synchronous on purpose and own whatever
// transport they need; the caller decides whether a failure matters.

pub trait Notifier {
    fn name(&self) -> &str;
    fn notify(&self, items: &[NewRelevantItem]) -> anyhow::Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_item() -> FeedItem {
        FeedItem {
            title: "Sample".to_owned(),
            authors: vec!["A. Author".to_owned()],
            summary: "Abstract".to_owned(),
            published: Some(Utc.with_ymd_and_hms(2025, 3, 4, 17, 30, 0).unwrap()),
            link: Some("http://arxiv.org/abs/2503.01234v1".to_owned()),
            raw_id: None,
        }
    }

    #[test]
    fn presence_helpers() {
        let item = sample_item();
        assert_eq!(item.published_date(), NaiveDate::from_ymd_opt(2025, 3, 4));
        assert_eq!(item.permalink(), "http://arxiv.org/abs/2503.01234v1");

        let bare = FeedItem { link: None, published: None, ..item };
        assert_eq!(bare.published_date(), None);
        assert_eq!(bare.permalink(), "");
    }

    #[test]
    fn external_id_displays_raw_token() {
        let id = ExternalId::new("2503.01234");
        assert_eq!(id.to_string(), "2503.01234");
        assert_eq!(id.as_str(), "2503.01234");
    }
}
