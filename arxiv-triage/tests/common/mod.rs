#![allow(dead_code)]

use arxiv_triage::classifier::{parse_answer, ClassifierError};
use arxiv_triage::types::{FeedItem, Result, TriageError, Verdict};
use arxiv_triage::{Harvester, RelevanceClassifier};
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, Once};

static INIT: Once = Once::new();

pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Fixed "now" shared by the scenarios.
pub fn run_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap()
}

pub fn paper(title: &str, id: Option<&str>, published: Option<DateTime<Utc>>) -> FeedItem {
    let link = id.map(|id| format!("http://arxiv.org/abs/{}v1", id));
    FeedItem {
        title: title.to_string(),
        authors: vec!["Ada Lovelace".to_string()],
        summary: format!("Abstract of {}", title),
        published,
        raw_id: link.clone(),
        link,
    }
}

pub fn days_ago(days: i64) -> Option<DateTime<Utc>> {
    Some(run_start() - Duration::days(days))
}

/// Serves canned items per topic and remembers which topics were asked for.
#[derive(Default)]
pub struct FakeHarvester {
    items: HashMap<String, Vec<FeedItem>>,
    failing: Vec<String>,
    pub requested: Mutex<Vec<String>>,
}

impl FakeHarvester {
    pub fn with_topic(mut self, topic: &str, items: Vec<FeedItem>) -> Self {
        self.items.insert(topic.to_string(), items);
        self
    }

    pub fn failing_on(mut self, topic: &str) -> Self {
        self.failing.push(topic.to_string());
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl Harvester for FakeHarvester {
    fn source_name(&self) -> String {
        "fake".to_string()
    }

    async fn harvest(&self, topic: &str, limit: usize) -> Result<Vec<FeedItem>> {
        self.requested.lock().unwrap().push(topic.to_string());
        if self.failing.iter().any(|t| t == topic) {
            return Err(TriageError::HttpStatus {
                status: 503,
                url: format!("http://export.arxiv.org/api/query?search_query=all:{}", topic),
            });
        }
        let mut items = self.items.get(topic).cloned().unwrap_or_default();
        items.truncate(limit);
        Ok(items)
    }
}

/// Answers per title with canned raw output; unknown titles answer "NO".
/// A raw answer of `None` simulates a failing classifier process.
#[derive(Default)]
pub struct FakeClassifier {
    answers: HashMap<String, Option<String>>,
    calls: AtomicUsize,
}

impl FakeClassifier {
    pub fn answer(mut self, title: &str, raw: &str) -> Self {
        self.answers.insert(title.to_string(), Some(raw.to_string()));
        self
    }

    pub fn fail_on(mut self, title: &str) -> Self {
        self.answers.insert(title.to_string(), None);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RelevanceClassifier for FakeClassifier {
    fn model_name(&self) -> String {
        "fake-model".to_string()
    }

    async fn classify(&self, title: &str, _abstract_text: &str) -> std::result::Result<Verdict, ClassifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.answers.get(title) {
            Some(Some(raw)) => Ok(parse_answer(raw)),
            Some(None) => Err(ClassifierError::ExitStatus {
                code: Some(1),
                stderr: "model not found".to_string(),
            }),
            None => Ok(parse_answer("NO")),
        }
    }
}
