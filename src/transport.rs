use std::future::Future;
use std::time::Duration;

use reqwest::Client;

use crate::model::{Delivery, WordBatch};

pub trait WordSink: Send + Sync {
    /// Best-effort delivery; never fails, only reports what happened.
    fn deliver(&self, batch: &WordBatch) -> impl Future<Output = Delivery> + Send;
}

pub fn http_client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder().timeout(timeout).build()
}

/// Posts word batches to the collector. Any HTTP answer counts as delivered.
pub struct Transport {
    client: Client,
    url: String,
}

impl Transport {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Transport {
            client,
            url: url.into(),
        }
    }
}

impl WordSink for Transport {
    async fn deliver(&self, batch: &WordBatch) -> Delivery {
        match self.client.post(&self.url).json(batch).send().await {
            Ok(resp) => {
                let status = resp.status();
                if !status.is_success() {
                    tracing::warn!(url = %self.url, "collector answered {} to word batch", status);
                }
                Delivery::Delivered(status.as_u16())
            }
            Err(e) => {
                tracing::error!(url = %self.url, words = batch.words.len(), "failed to send words: {}", e);
                Delivery::Dropped(e.to_string())
            }
        }
    }
}
