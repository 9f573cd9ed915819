//! Submission notice delivery

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::NotifyError;
use crate::notice::SubmissionNotice;

/// Delivers submission notices
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notice: SubmissionNotice) -> Result<(), NotifyError>;
}

/// Posts each notice as JSON to a fixed webhook URL
pub struct WebhookNotifier {
    url: String,
    client: Client,
}

impl WebhookNotifier {
    /// Create a new webhook notifier
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, NotifyError> {
        let url = url.into();
        let client = Client::builder().timeout(timeout).build()?;

        info!("Submission notices will be posted to {}", url);

        Ok(Self { url, client })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, notice: SubmissionNotice) -> Result<(), NotifyError> {
        debug!(
            "Posting {} notice for {}",
            notice.status.as_str(),
            notice.submission_url
        );

        let response = self.client.post(&self.url).json(&notice).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(NotifyError::UnexpectedStatus {
                status: status.as_u16(),
                url: self.url.clone(),
            });
        }

        Ok(())
    }
}

/// Writes notices to the log when no webhook is configured
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, notice: SubmissionNotice) -> Result<(), NotifyError> {
        info!(
            status = notice.status.as_str(),
            email = %notice.email,
            submission_url = %notice.submission_url,
            "Submission notice"
        );
        Ok(())
    }
}
