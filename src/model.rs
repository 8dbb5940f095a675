use serde::{Deserialize, Serialize};

/// One extracted word. Empty strings stand for line breaks and `"\t"` for tab markers.
pub type WordToken = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteStatus {
    pub enabled: bool,
    pub memory_enabled: bool,
    pub force: bool,
}

impl RemoteStatus {
    /// Status used when the collector could not be reached or answered garbage.
    pub fn disabled() -> Self {
        RemoteStatus {
            enabled: false,
            memory_enabled: true,
            force: false,
        }
    }

    /// Only literal `true` enables and forces; memory stays on unless literally `false`.
    pub fn from_json(value: &serde_json::Value) -> Self {
        let flag = |name: &str| value.get(name).and_then(|v| v.as_bool());
        RemoteStatus {
            enabled: flag("enabled") == Some(true),
            memory_enabled: flag("memory_enabled") != Some(false),
            force: flag("force") == Some(true),
        }
    }

    pub fn cycle_config(&self) -> CycleConfig {
        CycleConfig {
            memory_enabled: self.memory_enabled,
        }
    }
}

/// Per-cycle settings handed to the diff step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleConfig {
    pub memory_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordBatch {
    pub words: Vec<WordToken>,
}

impl WordBatch {
    pub fn new(words: &[WordToken]) -> Self {
        WordBatch {
            words: words.to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncCursor {
    pub origin: String,
    pub sent_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Delivered(u16),
    Dropped(String),
}

impl Delivery {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Delivery::Delivered(_))
    }
}

/// The page as read at the start of a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSnapshot {
    pub url: String,
    pub html: String,
}

impl PageSnapshot {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        PageSnapshot {
            url: url.into(),
            html: html.into(),
        }
    }

    /// Host part of the page url, or the raw url when it has none.
    pub fn origin(&self) -> String {
        match reqwest::Url::parse(&self.url) {
            Ok(url) => url
                .host_str()
                .map(|h| h.to_string())
                .unwrap_or_else(|| self.url.clone()),
            Err(_) => self.url.clone(),
        }
    }
}
