use crate::types::{FetchConfig, Result, TriageError};
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use url::Url;

/// HTTP client for the feed endpoint.
///
/// There is no retry loop: a failed request is returned to the caller as is.
pub struct Fetcher {
    client: Client,
    config: FetchConfig,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()?;

        Ok(Self { client, config })
    }

    pub async fn fetch_text(&self, url: &Url) -> Result<String> {
        let start_time = Instant::now();
        debug!(stage = "harvest", %url, "Requesting feed");

        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        debug!(
            stage = "harvest",
            status = status.as_u16(),
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "Feed response received"
        );

        if !status.is_success() {
            return Err(TriageError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        // Check content length
        if let Some(content_length) = response.content_length() {
            let size_mb = content_length as usize / (1024 * 1024);
            if size_mb > self.config.max_feed_size_mb {
                return Err(TriageError::FeedTooLarge { size_mb });
            }
        }

        let content = response.text().await?;
        info!(stage = "harvest", %url, bytes = content.len(), "Fetched feed");
        Ok(content)
    }
}
