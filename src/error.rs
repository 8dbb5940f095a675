use std::{error::Error, fmt};

#[derive(Debug)]
pub enum CursorStoreError {
    Database(Box<dyn Error + Send + Sync + 'static>),
    LockError(String),
}

impl std::error::Error for CursorStoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        use CursorStoreError::*;
        match self {
            Database(e) => Some(e.as_ref() as &dyn Error),
            _ => None,
        }
    }
}

impl fmt::Display for CursorStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use CursorStoreError::*;
        match self {
            Database(e) => write!(f, "DatabaseError: {}", e),
            LockError(s) => write!(f, "LockError: {}", s),
        }
    }
}

impl From<libsql::Error> for CursorStoreError {
    fn from(error: libsql::Error) -> Self {
        CursorStoreError::Database(Box::new(error))
    }
}

/// Failure to obtain the current page snapshot for a tick.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("failed to read snapshot {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to fetch page {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown schema '{schema}' for site pattern '{pattern}'")]
    UnknownSchema { pattern: String, schema: String },
    #[error("page source needs either page.url or page.snapshot_path")]
    MissingPage,
    #[error("site pattern must not be empty")]
    EmptyPattern,
}
