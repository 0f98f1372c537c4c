pub mod types;
pub mod config;
pub mod identity;
pub mod cache;
pub mod classifier;
pub mod fetcher;
pub mod parser;
pub mod harvester;
pub mod traits;
pub mod pipeline;
pub mod report;

pub use types::*;
pub use cache::DedupCache;
pub use classifier::{ClassifierError, CommandClassifier};
pub use config::{load_config, TriageConfig};
pub use harvester::ArxivHarvester;
pub use identity::extract_external_id;
pub use pipeline::{PipelineSettings, RunAccumulator, TriagePipeline};
pub use report::{dispatch_notification, render_report, NotifyOutcome};
pub use traits::{Harvester, RelevanceClassifier};
