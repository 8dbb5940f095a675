use std::future::Future;

use reqwest::Client;

use crate::model::RemoteStatus;

pub trait StatusSource: Send + Sync {
    /// One status request. Failures come back as a disabled status.
    fn poll(&self) -> impl Future<Output = RemoteStatus> + Send;
}

/// Asks the collector whether words should be sent this tick.
pub struct StatusPoller {
    client: Client,
    url: String,
}

impl StatusPoller {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        StatusPoller {
            client,
            url: url.into(),
        }
    }

    async fn fetch(&self) -> Result<RemoteStatus, reqwest::Error> {
        let body: serde_json::Value = self.client.get(&self.url).send().await?.json().await?;
        Ok(RemoteStatus::from_json(&body))
    }
}

impl StatusSource for StatusPoller {
    async fn poll(&self) -> RemoteStatus {
        match self.fetch().await {
            Ok(status) => {
                tracing::debug!(
                    enabled = status.enabled,
                    memory_enabled = status.memory_enabled,
                    force = status.force,
                    "parsing status"
                );
                status
            }
            Err(e) => {
                tracing::debug!(url = %self.url, "status poll failed, treating as disabled: {}", e);
                RemoteStatus::disabled()
            }
        }
    }
}
