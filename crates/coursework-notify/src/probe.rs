//! Submission URL reachability probe

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::NotifyError;

/// Checks that a submitted archive URL is reachable
#[async_trait]
pub trait UrlProbe: Send + Sync {
    /// `Ok(())` when the URL answers a `HEAD` with a 2xx status
    async fn probe(&self, url: &str) -> Result<(), NotifyError>;
}

/// Probe configuration
#[derive(Clone, Debug)]
pub struct HttpProbeConfig {
    /// Total time allowed for one probe
    pub timeout: Duration,
}

impl Default for HttpProbeConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
        }
    }
}

/// `HEAD`-request probe backed by reqwest
pub struct HttpProbe {
    client: Client,
}

impl HttpProbe {
    /// Create a new probe
    pub fn new(config: HttpProbeConfig) -> Result<Self, NotifyError> {
        let client = Client::builder().timeout(config.timeout).build()?;

        info!("Created URL probe (timeout {:?})", config.timeout);

        Ok(Self { client })
    }
}

#[async_trait]
impl UrlProbe for HttpProbe {
    async fn probe(&self, url: &str) -> Result<(), NotifyError> {
        debug!("Probing submission URL: {}", url);

        let response = self.client.head(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(NotifyError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(())
    }
}
