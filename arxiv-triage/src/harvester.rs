use crate::fetcher::Fetcher;
use crate::parser::FeedParser;
use crate::traits::Harvester;
use crate::types::{FeedItem, FetchConfig, Result, TimeWindow};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::cmp::Reverse;
use tracing::info;
use url::Url;

impl TimeWindow {
    /// Window of `days_back` days ending at `now`. A span too large for the
    /// calendar is clamped to the earliest representable instant.
    pub fn ending_at(now: DateTime<Utc>, days_back: i64) -> Self {
        let start = Duration::try_days(days_back)
            .and_then(|span| now.checked_sub_signed(span))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        Self { start, end: now }
    }

    /// Both bounds are inclusive.
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.start <= ts && ts <= self.end
    }
}

/// Keyword search against the arXiv export API.
pub struct ArxivHarvester {
    fetcher: Fetcher,
    endpoint: Url,
}

impl ArxivHarvester {
    pub fn new(endpoint: &str, fetch_config: FetchConfig) -> Result<Self> {
        Ok(Self {
            fetcher: Fetcher::new(fetch_config)?,
            endpoint: Url::parse(endpoint)?,
        })
    }

    pub fn build_query_url(&self, topic: &str, limit: usize) -> Url {
        let search_query = format!("all:{}", topic.trim());
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .clear()
            .append_pair("search_query", &search_query)
            .append_pair("start", "0")
            .append_pair("max_results", &limit.to_string())
            .append_pair("sortBy", "submittedDate")
            .append_pair("sortOrder", "descending");
        url
    }
}

#[async_trait]
impl Harvester for ArxivHarvester {
    fn source_name(&self) -> String {
        match self.endpoint.host_str() {
            Some(host) => format!("arXiv ({})", host),
            None => "arXiv".to_string(),
        }
    }

    async fn harvest(&self, topic: &str, limit: usize) -> Result<Vec<FeedItem>> {
        let url = self.build_query_url(topic, limit);
        info!(stage = "harvest", topic, limit, "Querying {}", self.source_name());

        let content = self.fetcher.fetch_text(&url).await?;
        let items = order_and_limit(FeedParser::parse_entries(&content)?, limit);

        info!(stage = "harvest", topic, "Harvested {} entries", items.len());
        Ok(items)
    }
}

/// Most recent first, undated entries last, at most `limit` items.
pub fn order_and_limit(mut items: Vec<FeedItem>, limit: usize) -> Vec<FeedItem> {
    // Option orders None first, so Reverse puts it last
    items.sort_by_key(|item| Reverse(item.published));
    items.truncate(limit);
    items
}
