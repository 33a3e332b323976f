use anyhow::{anyhow, bail, Context, Result};
use futures::StreamExt;
use reqwest::header::{CACHE_CONTROL, PRAGMA};
use reqwest::Client;
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

/// One attempt at loading the continuous visual feed
///
/// The feed has no structured payload: a load either renders (`Ok`) or errors.
#[async_trait::async_trait]
pub trait FeedTransport: Send + Sync {
    /// Load the feed with `cache_buster` attached so no cached result is reused
    async fn load(&self, cache_buster: &str) -> Result<()>;
}

/// Loads the feed over HTTP; the first body chunk counts as a rendered frame
pub struct HttpFeedTransport {
    feed_url: String,
    client: Client,
    load_timeout: Duration,
}

impl HttpFeedTransport {
    pub fn new(base_url: &str, path: &str, load_timeout: Duration) -> Result<Self> {
        // Streams never finish; only the connect and first frame are bounded
        let client = Client::builder()
            .connect_timeout(load_timeout)
            .build()
            .context("Failed to build feed HTTP client")?;

        Ok(Self {
            feed_url: format!("{}{}", base_url.trim_end_matches('/'), path),
            client,
            load_timeout,
        })
    }

    pub fn feed_url(&self) -> &str {
        &self.feed_url
    }

    async fn first_frame(&self, cache_buster: &str) -> Result<usize> {
        let response = self
            .client
            .get(&self.feed_url)
            .query(&[("t", cache_buster)])
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache")
            .send()
            .await
            .context("Failed to connect to feed")?;

        if !response.status().is_success() {
            bail!("Feed returned HTTP {}", response.status());
        }

        let mut stream = response.bytes_stream();
        loop {
            match stream.next().await {
                Some(Ok(chunk)) if chunk.is_empty() => continue,
                Some(Ok(chunk)) => return Ok(chunk.len()),
                Some(Err(e)) => return Err(e).context("Feed stream failed"),
                None => bail!("Feed closed before the first frame"),
            }
        }
    }
}

#[async_trait::async_trait]
impl FeedTransport for HttpFeedTransport {
    async fn load(&self, cache_buster: &str) -> Result<()> {
        let bytes = timeout(self.load_timeout, self.first_frame(cache_buster))
            .await
            .map_err(|_| anyhow!("Feed did not deliver a frame within {:?}", self.load_timeout))??;

        debug!("Feed loaded ({} bytes in first chunk)", bytes);
        Ok(())
    }
}
