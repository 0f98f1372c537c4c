use crate::types::ExternalId;
use regex::Regex;
use std::sync::LazyLock;

static AFTER_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/(\d{4}\.\d{4,5})").expect("valid arXiv id pattern"));

static ANYWHERE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{4}\.\d{4,5}").expect("valid arXiv id pattern"));

/// Derive the dedup key from an entry id or permalink.
///
/// A token directly after a `/` wins over one found elsewhere in the input.
/// Version suffixes are dropped, so `http://arxiv.org/abs/2401.12345v2`
/// yields `2401.12345`. Inputs without a recognizable token yield `None`,
/// which marks the item as non-cacheable.
pub fn extract_external_id(raw: Option<&str>) -> Option<ExternalId> {
    let raw = raw?;

    if let Some(caps) = AFTER_SEPARATOR.captures(raw) {
        return Some(ExternalId::new(&caps[1]));
    }

    ANYWHERE.find(raw).map(|m| ExternalId::new(m.as_str()))
}

/// Try the entry id first, then fall back to the permalink.
pub fn external_id_for(raw_id: Option<&str>, link: Option<&str>) -> Option<ExternalId> {
    extract_external_id(raw_id).or_else(|| extract_external_id(link))
}
