//! HTTP client issuing the health/sync GET.

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;

use super::Probe;
use super::retry::{AttemptResult, classify_error, classify_status};
use crate::config::Config;

pub const USER_AGENT: &str = concat!("order-sync/", env!("CARGO_PKG_VERSION"));

/// HTTP client performing one GET per attempt.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a new HTTP client wrapping the given reqwest Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds the reqwest client described by `config`.
    ///
    /// Certificate validation stays on unless `accept_invalid_certs` is set,
    /// in which case a warning is logged.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut builder = Client::builder().user_agent(USER_AGENT);

        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        if config.accept_invalid_certs {
            warn!("TLS certificate validation is DISABLED; do not use this in production");
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder.build().context("Failed to build HTTP client")?;
        Ok(Self::new(client))
    }
}

#[async_trait]
impl Probe for HttpClient {
    /// Sends a GET to `url` and classifies the outcome. The body is discarded.
    #[tracing::instrument(skip(self))]
    async fn attempt(&self, url: &str) -> AttemptResult {
        debug!("GET {}...", url);

        match self.client.get(url).send().await {
            Ok(response) => {
                let status = response.status();
                debug!("{} responded with {}", url, status);
                classify_status(status)
            }
            Err(e) => classify_error(e),
        }
    }
}
