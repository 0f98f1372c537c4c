use chrono::{TimeZone, Utc};
use interfaces::defs::{ExternalId, FeedItem, NewRelevantItem};

pub fn new_item(title: &str, id: &str, day: u32) -> NewRelevantItem {
    NewRelevantItem {
        item: FeedItem {
            title: title.to_string(),
            authors: vec!["Ada Lovelace".to_string()],
            summary: "An abstract that must never reach the email body.".to_string(),
            published: Some(Utc.with_ymd_and_hms(2025, 3, day, 14, 0, 0).unwrap()),
            link: Some(format!("http://arxiv.org/abs/{}v1", id)),
            raw_id: Some(format!("http://arxiv.org/abs/{}v1", id)),
        },
        external_id: Some(ExternalId::new(id)),
    }
}

pub fn lookup_from<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
    move |key| {
        pairs
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.to_string())
    }
}
