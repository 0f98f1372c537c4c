use crate::types::{FetchConfig, Result, TriageError};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Upper bound on `feed.days_back`, roughly a century.
pub const MAX_DAYS_BACK: i64 = 36_500;

#[derive(Debug, Deserialize, Clone)]
pub struct TriageConfig {
    #[serde(default = "default_topics")]
    pub topics: Vec<String>,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FeedConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default = "default_days_back")]
    pub days_back: i64,
    #[serde(default = "default_topic_pause_secs")]
    pub topic_pause_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ClassifierConfig {
    #[serde(default = "default_program")]
    pub program: String,
    /// `{model}` is replaced by `model`.
    #[serde(default = "default_args")]
    pub args: Vec<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_classifier_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_criteria")]
    pub criteria: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    #[serde(default = "default_cache_path")]
    pub path: PathBuf,
}

fn default_topics() -> Vec<String> {
    [
        "unstructured data analysis",
        "querying unstructured data",
        "semi structured data",
        "text to table",
        "text to relational schema",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
fn default_endpoint() -> String {
    "http://export.arxiv.org/api/query".to_string()
}
fn default_max_results() -> usize {
    10
}
fn default_days_back() -> i64 {
    7
}
fn default_topic_pause_secs() -> u64 {
    3
}
fn default_user_agent() -> String {
    FetchConfig::default().user_agent
}
fn default_timeout_secs() -> u64 {
    FetchConfig::default().timeout_seconds
}
fn default_program() -> String {
    "ollama".to_string()
}
fn default_args() -> Vec<String> {
    vec!["run".to_string(), "{model}".to_string()]
}
fn default_model() -> String {
    "gemma2:2b".to_string()
}
fn default_classifier_timeout() -> u64 {
    300
}
fn default_criteria() -> Vec<String> {
    [
        "Unstructured data analysis",
        "Querying unstructured data",
        "Semi-structured data analysis",
        "Text-to-table or text-to-relational schema",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
fn default_cache_path() -> PathBuf {
    PathBuf::from("seen_papers.txt")
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            topics: default_topics(),
            feed: FeedConfig::default(),
            classifier: ClassifierConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            max_results: default_max_results(),
            days_back: default_days_back(),
            topic_pause_secs: default_topic_pause_secs(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: default_args(),
            model: default_model(),
            timeout_secs: default_classifier_timeout(),
            criteria: default_criteria(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: default_cache_path(),
        }
    }
}

impl FeedConfig {
    pub fn topic_pause(&self) -> Duration {
        Duration::from_secs(self.topic_pause_secs)
    }

    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig {
            user_agent: self.user_agent.clone(),
            timeout_seconds: self.timeout_secs,
            ..FetchConfig::default()
        }
    }
}

impl TriageConfig {
    pub fn validate(&self) -> Result<()> {
        if self.topics.is_empty() {
            return Err(TriageError::Config("at least one topic is required".to_string()));
        }
        if self.topics.iter().any(|t| t.trim().is_empty()) {
            return Err(TriageError::Config("topics must not be blank".to_string()));
        }
        if self.feed.max_results == 0 {
            return Err(TriageError::Config("feed.max_results must be greater than 0".to_string()));
        }
        if !(0..=MAX_DAYS_BACK).contains(&self.feed.days_back) {
            return Err(TriageError::Config(format!(
                "feed.days_back must be between 0 and {}",
                MAX_DAYS_BACK
            )));
        }
        if self.classifier.program.trim().is_empty() {
            return Err(TriageError::Config("classifier.program must not be empty".to_string()));
        }
        if self.classifier.timeout_secs == 0 {
            return Err(TriageError::Config("classifier.timeout_secs must be greater than 0".to_string()));
        }
        Ok(())
    }
}

/// Load configuration from a TOML file, or the built-in defaults when no
/// path is given.
pub fn load_config(path: Option<&Path>) -> Result<TriageConfig> {
    let config = match path {
        Some(path) => {
            let content = std::fs::read_to_string(path).map_err(|e| {
                TriageError::Config(format!("failed to read config file {}: {}", path.display(), e))
            })?;
            parse_config(&content)
                .map_err(|e| TriageError::Config(format!("{}: {}", path.display(), e)))?
        }
        None => TriageConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

fn parse_config(content: &str) -> std::result::Result<TriageConfig, toml::de::Error> {
    toml::from_str(content)
}
