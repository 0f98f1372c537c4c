use crate::cache::DedupCache;
use crate::config::TriageConfig;
use crate::identity::external_id_for;
use crate::traits::{Harvester, RelevanceClassifier};
use crate::types::{
    FeedItem, ItemOutcome, NewRelevantItem, RelevantEntry, Result, RunOutcome, RunStats, TimeWindow,
    TopicSummary,
};
use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Run-scoped settings handed to the orchestrator at construction.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub topics: Vec<String>,
    pub max_results: usize,
    pub days_back: i64,
    pub topic_pause: Duration,
}

impl PipelineSettings {
    pub fn from_config(config: &TriageConfig) -> Self {
        Self {
            topics: config.topics.clone(),
            max_results: config.feed.max_results,
            days_back: config.feed.days_back,
            topic_pause: config.feed.topic_pause(),
        }
    }
}

/// Counters and result lists for a single run.
#[derive(Debug, Default)]
pub struct RunAccumulator {
    pub stats: RunStats,
    pub relevant: Vec<RelevantEntry>,
    pub new_items: Vec<NewRelevantItem>,
}

impl RunAccumulator {
    pub fn into_outcome(self, window: TimeWindow) -> RunOutcome {
        RunOutcome {
            window,
            stats: self.stats,
            relevant: self.relevant,
            new_items: self.new_items,
        }
    }
}

/// Drives harvest → window → identity → cache → classify for every topic,
/// strictly one topic and one item at a time.
pub struct TriagePipeline<H, C> {
    harvester: H,
    classifier: C,
    cache: DedupCache,
    settings: PipelineSettings,
}

impl<H: Harvester, C: RelevanceClassifier> TriagePipeline<H, C> {
    pub fn new(harvester: H, classifier: C, cache: DedupCache, settings: PipelineSettings) -> Self {
        Self {
            harvester,
            classifier,
            cache,
            settings,
        }
    }

    pub fn harvester(&self) -> &H {
        &self.harvester
    }

    pub fn cache(&self) -> &DedupCache {
        &self.cache
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Process every configured topic against a window ending at `now`.
    ///
    /// A harvest failure aborts the run; classifier and cache failures are
    /// logged and the run carries on.
    pub async fn run(&mut self, now: DateTime<Utc>) -> Result<RunOutcome> {
        let run_id = Uuid::new_v4();
        let span = info_span!("run", %run_id);
        self.run_topics(now).instrument(span).await
    }

    async fn run_topics(&mut self, now: DateTime<Utc>) -> Result<RunOutcome> {
        let window = TimeWindow::ending_at(now, self.settings.days_back);
        info!(
            stage = "window",
            start = %window.start,
            end = %window.end,
            topics = self.settings.topics.len(),
            max_results = self.settings.max_results,
            model = %self.classifier.model_name(),
            cached_ids = self.cache.len(),
            "Starting run"
        );

        let mut acc = RunAccumulator::default();
        let topics = self.settings.topics.clone();

        for (idx, topic) in topics.iter().enumerate() {
            info!(stage = "harvest", "Processing topic {}/{}: '{}'", idx + 1, topics.len(), topic);

            let items = self.harvester.harvest(topic, self.settings.max_results).await?;
            let mut summary = TopicSummary {
                topic: topic.clone(),
                retrieved: items.len(),
                ..TopicSummary::default()
            };
            acc.stats.retrieved += items.len();

            for item in items {
                let outcome = self.process_item(topic, item, &window, &mut acc).await;
                if outcome != ItemOutcome::Skipped {
                    summary.in_window += 1;
                }
                if outcome.is_relevant() {
                    summary.relevant += 1;
                }
            }

            info!(
                stage = "report",
                topic = %topic,
                retrieved = summary.retrieved,
                in_window = summary.in_window,
                relevant = summary.relevant,
                "Topic finished"
            );
            acc.stats.topics.push(summary);

            if idx + 1 < topics.len() && !self.settings.topic_pause.is_zero() {
                debug!(stage = "harvest", "Waiting {:?} before next topic", self.settings.topic_pause);
                tokio::time::sleep(self.settings.topic_pause).await;
            }
        }

        info!(
            stage = "report",
            retrieved = acc.stats.retrieved,
            in_window = acc.stats.in_window,
            cache_hits = acc.stats.cache_hits,
            classifier_calls = acc.stats.classifier_calls,
            classifier_failures = acc.stats.classifier_failures,
            relevant = acc.stats.relevant,
            new_relevant = acc.stats.new_relevant,
            "Run complete"
        );
        Ok(acc.into_outcome(window))
    }

    /// Move one item to its terminal state, updating `acc` and the cache.
    pub async fn process_item(
        &mut self,
        topic: &str,
        item: FeedItem,
        window: &TimeWindow,
        acc: &mut RunAccumulator,
    ) -> ItemOutcome {
        let title = short_title(&item.title);

        let published = match item.published {
            Some(ts) if window.contains(ts) => ts,
            Some(ts) => {
                debug!(stage = "window", title = %title, published = %ts, "Outside date range, skipping");
                acc.stats.skipped += 1;
                return ItemOutcome::Skipped;
            }
            None => {
                debug!(stage = "window", title = %title, "No publication date, skipping");
                acc.stats.skipped += 1;
                return ItemOutcome::Skipped;
            }
        };
        acc.stats.in_window += 1;

        let external_id = external_id_for(item.raw_id.as_deref(), item.link.as_deref());
        let cached = external_id.as_ref().is_some_and(|id| self.cache.contains(id));
        match &external_id {
            Some(id) if cached => {
                info!(stage = "cache", topic, id = %id, title = %title, "Already known relevant, skipping classifier")
            }
            Some(id) => debug!(stage = "identity", id = %id, "Cache miss"),
            None => debug!(stage = "identity", title = %title, "No recognizable id, item will not be cached"),
        }

        if cached {
            acc.stats.cache_hits += 1;
            acc.stats.relevant += 1;
            acc.relevant.push(RelevantEntry {
                date: published.date_naive(),
                item,
                newly_classified: false,
            });
            return ItemOutcome::CachedRelevant;
        }

        acc.stats.classifier_calls += 1;
        let verdict = match self.classifier.classify(&item.title, &item.summary).await {
            Ok(verdict) => verdict,
            Err(e) => {
                warn!(stage = "classify", title = %title, error = %e, "Classifier failed, treating as NOT RELEVANT");
                acc.stats.classifier_failures += 1;
                return ItemOutcome::ClassifiedNotRelevant;
            }
        };

        if !verdict.relevant {
            info!(stage = "classify", title = %title, answer = %verdict.answer, "Paper marked as NOT RELEVANT");
            return ItemOutcome::ClassifiedNotRelevant;
        }

        info!(stage = "classify", topic, title = %title, "Paper marked as RELEVANT");
        if let Some(id) = &external_id {
            self.cache.record(id.clone());
        }

        acc.stats.relevant += 1;
        acc.stats.new_relevant += 1;
        acc.relevant.push(RelevantEntry {
            date: published.date_naive(),
            item: item.clone(),
            newly_classified: true,
        });
        acc.new_items.push(NewRelevantItem { item, external_id });
        ItemOutcome::ClassifiedRelevant
    }
}

fn short_title(title: &str) -> String {
    let mut chars = title.chars();
    let head: String = chars.by_ref().take(60).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}
