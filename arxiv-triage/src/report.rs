use crate::types::{FeedItem, NewRelevantItem, Notifier, RelevantEntry, RunOutcome};
use std::fmt::Write;
use tracing::{info, warn};

const SUMMARY_CHARS: usize = 600;

/// Result of the single end-of-run notification attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyOutcome {
    NothingNew,
    Disabled,
    Sent,
    Failed,
}

/// Format one relevant paper for the console report.
pub fn format_entry(item: &FeedItem) -> String {
    let published = item
        .published
        .map(|ts| ts.format("%Y-%m-%dT%H:%M:%SZ").to_string())
        .unwrap_or_default();

    format!(
        "Title: {}\nAuthors: {}\nDate: {}\nLink: {}\nSummary: {}...\n{}\n",
        item.title.trim(),
        item.authors.join(", "),
        published,
        item.permalink(),
        truncate_chars(item.summary.trim(), SUMMARY_CHARS),
        "-".repeat(80)
    )
}

/// Render the human-readable run report.
///
/// Entries are stable-sorted by date, newest first, so discovery order
/// (topic order, then feed order) is kept within a day.
pub fn render_report(outcome: &RunOutcome, model: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "\n=== arXiv Report ({} → {}) Filtered by {} ===",
        outcome.window.start.date_naive(),
        outcome.window.end.date_naive(),
        model
    );

    for topic in &outcome.stats.topics {
        let _ = writeln!(out, "\n--- Searching for: {} ---", topic.topic);
        let _ = writeln!(
            out,
            "{} retrieved, {} in range, {} relevant",
            topic.retrieved, topic.in_window, topic.relevant
        );
    }

    if outcome.relevant.is_empty() {
        let days = (outcome.window.end - outcome.window.start).num_days();
        let _ = writeln!(out, "\nNo relevant papers found for the last {} days.", days);
        return out;
    }

    let new_count = outcome.relevant.iter().filter(|e| e.newly_classified).count();
    let _ = writeln!(
        out,
        "\n{} relevant paper(s), {} new since the last run",
        outcome.relevant.len(),
        new_count
    );

    let mut current_date = None;
    for entry in sorted_by_date(&outcome.relevant) {
        if current_date != Some(entry.date) {
            current_date = Some(entry.date);
            let _ = writeln!(out, "\n##### {} #####\n", entry.date);
        }
        out.push_str(&format_entry(&entry.item));
    }
    out
}

fn sorted_by_date(entries: &[RelevantEntry]) -> Vec<&RelevantEntry> {
    let mut sorted: Vec<&RelevantEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));
    sorted
}

/// Send the run's newly classified items in one batch, if there are any.
///
/// A missing notifier or a delivery failure never fails the run.
pub fn dispatch_notification(notifier: Option<&dyn Notifier>, items: &[NewRelevantItem]) -> NotifyOutcome {
    if items.is_empty() {
        info!(stage = "notify", "No new relevant papers, nothing to send");
        return NotifyOutcome::NothingNew;
    }

    let Some(notifier) = notifier else {
        info!(stage = "notify", pending = items.len(), "Notification disabled, skipping");
        return NotifyOutcome::Disabled;
    };

    match notifier.notify(items) {
        Ok(()) => {
            info!(stage = "notify", notifier = notifier.name(), items = items.len(), "Notification sent");
            NotifyOutcome::Sent
        }
        Err(e) => {
            warn!(stage = "notify", notifier = notifier.name(), error = %e, "Failed to send notification");
            NotifyOutcome::Failed
        }
    }
}

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
