use crate::classifier::ClassifierError;
use crate::types::{FeedItem, Result, Verdict};
use async_trait::async_trait;

/// Trait for pulling candidate items for one search topic
#[async_trait]
pub trait Harvester: Send + Sync {
    /// Human-readable name for this source
    fn source_name(&self) -> String;

    /// Fetch at most `limit` items for `topic`, most recent first.
    /// Transport failures are returned to the caller, which decides whether
    /// the run can continue.
    async fn harvest(&self, topic: &str, limit: usize) -> Result<Vec<FeedItem>>;
}

/// Trait for the external yes/no relevance judge
#[async_trait]
pub trait RelevanceClassifier: Send + Sync {
    /// Name of the backing model, used in the report header
    fn model_name(&self) -> String;

    async fn classify(&self, title: &str, abstract_text: &str) -> std::result::Result<Verdict, ClassifierError>;
}
