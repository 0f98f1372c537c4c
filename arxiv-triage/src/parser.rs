use crate::types::{FeedItem, Result, TriageError};
use feed_rs::parser;
use tracing::{debug, info};

pub struct FeedParser;

impl FeedParser {
    /// Decode an Atom/RSS document into feed items, in document order.
    pub fn parse_entries(content: &str) -> Result<Vec<FeedItem>> {
        debug!(stage = "harvest", "Parsing feed content ({} bytes)", content.len());

        let feed = parser::parse(content.as_bytes())
            .map_err(|e| TriageError::Parse(format!("Failed to parse feed: {}", e)))?;

        let items: Vec<FeedItem> = feed.entries.into_iter().map(Self::parse_entry).collect();

        info!(stage = "harvest", "Parsed feed with {} entries", items.len());
        Ok(items)
    }

    fn parse_entry(entry: feed_rs::model::Entry) -> FeedItem {
        let title = entry
            .title
            .map(|t| collapse_whitespace(&t.content))
            .unwrap_or_default();

        let summary = entry
            .summary
            .map(|s| s.content.trim().to_string())
            .unwrap_or_default();

        // Prefer the abstract page over the PDF link
        let link = entry
            .links
            .iter()
            .find(|l| l.rel.as_deref() == Some("alternate"))
            .or_else(|| entry.links.first())
            .map(|l| l.href.clone());

        let raw_id = if entry.id.trim().is_empty() {
            None
        } else {
            Some(entry.id.trim().to_string())
        };

        let authors = entry
            .authors
            .into_iter()
            .map(|a| a.name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();

        FeedItem {
            title,
            authors,
            summary,
            published: entry.published,
            link,
            raw_id,
        }
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    const ARXIV_SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title type="html">ArXiv Query: search_query=all:text to table</title>
  <id>http://arxiv.org/api/sample</id>
  <updated>2025-03-05T00:00:00-05:00</updated>
  <entry>
    <id>http://arxiv.org/abs/2503.01234v1</id>
    <updated>2025-03-04T17:30:00Z</updated>
    <published>2025-03-04T17:30:00Z</published>
    <title>Turning Text
      into Tables</title>
    <summary>  We study text-to-table generation.  </summary>
    <author><name>Ada Lovelace</name></author>
    <author><name>Alan Turing</name></author>
    <link href="http://arxiv.org/abs/2503.01234v1" rel="alternate" type="text/html"/>
    <link title="pdf" href="http://arxiv.org/pdf/2503.01234v1" rel="related" type="application/pdf"/>
  </entry>
  <entry>
    <id>http://arxiv.org/abs/2502.09999v2</id>
    <updated>2025-02-20T08:00:00Z</updated>
    <published>2025-02-19T08:00:00Z</published>
    <title>Older Paper</title>
    <summary>Semi-structured logs.</summary>
    <author><name>Grace Hopper</name></author>
    <link href="http://arxiv.org/abs/2502.09999v2" rel="alternate" type="text/html"/>
  </entry>
</feed>"#;

    #[test]
    fn parses_arxiv_atom_entries() {
        let items = FeedParser::parse_entries(ARXIV_SAMPLE).unwrap();
        assert_eq!(items.len(), 2);

        let first = &items[0];
        assert_eq!(first.title, "Turning Text into Tables");
        assert_eq!(first.authors, vec!["Ada Lovelace".to_string(), "Alan Turing".to_string()]);
        assert_eq!(first.summary, "We study text-to-table generation.");
        assert_eq!(first.published, Some(Utc.with_ymd_and_hms(2025, 3, 4, 17, 30, 0).unwrap()));
        assert_eq!(first.link.as_deref(), Some("http://arxiv.org/abs/2503.01234v1"));
        assert_eq!(first.raw_id.as_deref(), Some("http://arxiv.org/abs/2503.01234v1"));

        assert_eq!(items[1].title, "Older Paper");
    }

    #[test]
    fn rejects_non_feed_content() {
        let err = FeedParser::parse_entries("this is not xml").unwrap_err();
        assert!(matches!(err, TriageError::Parse(_)));
    }
}
