pub mod defs;

pub use defs::{ExternalId, FeedItem, NewRelevantItem, Notifier, Verdict};
