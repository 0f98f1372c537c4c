use arxiv_triage::{
    dispatch_notification, load_config, render_report, ArxivHarvester, CommandClassifier, DedupCache,
    PipelineSettings, RunStats, TriagePipeline,
};
use chrono::Utc;
use clap::Parser;
use email_notifier::{SmtpConfig, SmtpNotifier};
use interfaces::defs::Notifier;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Find new arXiv papers on the configured topics, triage them with a local
/// model and email what is new since the last run.
#[derive(Parser, Debug)]
#[command(name = "arxiv-triage", version)]
struct Cli {
    /// TOML configuration file; built-in defaults are used when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the dedup cache file
    #[arg(long)]
    cache_file: Option<PathBuf>,

    /// Override how many days back to look
    #[arg(long)]
    days_back: Option<i64>,

    /// Override the per-topic result cap
    #[arg(long)]
    max_results: Option<usize>,

    /// Override the classifier model
    #[arg(long)]
    model: Option<String>,

    /// Do not send the email notification even if SMTP is configured
    #[arg(long)]
    no_notify: bool,

    /// Write run statistics as JSON to this path
    #[arg(long)]
    stats_json: Option<PathBuf>,

    /// Debug-level logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(path) = cli.cache_file {
        config.cache.path = path;
    }
    if let Some(days_back) = cli.days_back {
        config.feed.days_back = days_back;
    }
    if let Some(max_results) = cli.max_results {
        config.feed.max_results = max_results;
    }
    if let Some(model) = cli.model {
        config.classifier.model = model;
    }
    config.validate()?;

    info!("Starting arXiv triage");

    let harvester = ArxivHarvester::new(&config.feed.endpoint, config.feed.fetch_config())?;
    let classifier = CommandClassifier::new(config.classifier.clone());
    let cache = DedupCache::load(&config.cache.path);
    let mut pipeline = TriagePipeline::new(harvester, classifier, cache, PipelineSettings::from_config(&config));

    let outcome = pipeline.run(Utc::now()).await.map_err(|e| {
        error!("Run aborted: {}", e);
        e
    })?;

    print!("{}", render_report(&outcome, &config.classifier.model));

    let notifier: Option<Box<dyn Notifier>> = if cli.no_notify {
        None
    } else {
        SmtpConfig::from_env().map(|smtp| Box::new(SmtpNotifier::new(smtp)) as Box<dyn Notifier>)
    };
    dispatch_notification(notifier.as_deref(), &outcome.new_items);

    if let Some(path) = cli.stats_json {
        if let Err(e) = write_stats(&path, &outcome.stats) {
            warn!(path = %path.display(), error = %e, "Failed to write run statistics");
        }
    }

    info!("arXiv triage finished");
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn write_stats(path: &Path, stats: &RunStats) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(stats)?;
    std::fs::write(path, json)?;
    Ok(())
}
