use std::future::Future;
use std::path::PathBuf;

use reqwest::Client;

use crate::config::Page;
use crate::error::{ConfigError, SourceError};
use crate::model::PageSnapshot;

pub trait PageSource: Send + Sync {
    fn snapshot(&self) -> impl Future<Output = Result<PageSnapshot, SourceError>> + Send;
}

/// Re-reads a saved copy of the page on every tick.
pub struct SnapshotFile {
    path: PathBuf,
    url: String,
}

impl SnapshotFile {
    pub fn new(path: impl Into<PathBuf>, url: impl Into<String>) -> Self {
        SnapshotFile {
            path: path.into(),
            url: url.into(),
        }
    }
}

impl PageSource for SnapshotFile {
    async fn snapshot(&self) -> Result<PageSnapshot, SourceError> {
        let html = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| SourceError::Io {
                path: self.path.display().to_string(),
                source,
            })?;
        Ok(PageSnapshot::new(self.url.clone(), html))
    }
}

/// Fetches the page over HTTP on every tick.
pub struct LivePage {
    client: Client,
    url: String,
}

impl LivePage {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        LivePage {
            client,
            url: url.into(),
        }
    }

    async fn fetch(&self) -> Result<PageSnapshot, reqwest::Error> {
        let resp = self.client.get(&self.url).send().await?.error_for_status()?;
        let url = resp.url().to_string();
        let html = resp.text().await?;
        Ok(PageSnapshot::new(url, html))
    }
}

impl PageSource for LivePage {
    async fn snapshot(&self) -> Result<PageSnapshot, SourceError> {
        self.fetch().await.map_err(|source| SourceError::Http {
            url: self.url.clone(),
            source,
        })
    }
}

/// Either kind of source, chosen from configuration.
pub enum ConfiguredPage {
    File(SnapshotFile),
    Live(LivePage),
}

impl ConfiguredPage {
    pub fn from_config(page: &Page, client: Client) -> Result<Self, ConfigError> {
        match (&page.snapshot_path, &page.url) {
            (Some(path), url) => Ok(ConfiguredPage::File(SnapshotFile::new(
                path,
                url.clone().unwrap_or_else(|| format!("file://{}", path)),
            ))),
            (None, Some(url)) => Ok(ConfiguredPage::Live(LivePage::new(client, url))),
            (None, None) => Err(ConfigError::MissingPage),
        }
    }
}

impl PageSource for ConfiguredPage {
    async fn snapshot(&self) -> Result<PageSnapshot, SourceError> {
        match self {
            ConfiguredPage::File(source) => source.snapshot().await,
            ConfiguredPage::Live(source) => source.snapshot().await,
        }
    }
}
