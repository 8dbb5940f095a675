//! Per-origin record of how many words have already been sent.
//!
//! Cursors are stored under a key derived from the origin, so the same host always
//! lands on the same row across restarts. Reads never fail: a missing, unreadable or
//! non-numeric value counts as zero.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;

use sha2::{Digest, Sha256};

use crate::db::Database;
use crate::error::CursorStoreError;
use crate::model::SyncCursor;

const KEY_PREFIX: &str = "last_sent_index:";

pub fn cursor_key(origin: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(origin.as_bytes());
    format!("{}{}", KEY_PREFIX, hex::encode(hasher.finalize()))
}

fn parse_count(origin: &str, raw: &str) -> u64 {
    match raw.trim().parse::<u64>() {
        Ok(n) => n,
        Err(_) => {
            tracing::warn!(origin, value = raw, "ignoring corrupt cursor value");
            0
        }
    }
}

pub trait CursorStore: Send + Sync {
    fn read(&self, origin: &str) -> impl Future<Output = u64> + Send;

    fn write(&self, origin: &str, sent_count: u64) -> impl Future<Output = Result<(), CursorStoreError>> + Send;

    fn clear(&self, origin: &str) -> impl Future<Output = Result<(), CursorStoreError>> + Send;
}

impl CursorStore for Database {
    async fn read(&self, origin: &str) -> u64 {
        let key = cursor_key(origin);
        let query = "SELECT value FROM sync_cursors WHERE key = ?";
        let row = match self.connection().query(query, libsql::params![key]).await {
            Ok(mut rows) => rows.next().await,
            Err(e) => Err(e),
        };

        match row {
            Ok(Some(row)) => match row.get::<String>(0) {
                Ok(raw) => parse_count(origin, &raw),
                Err(e) => {
                    tracing::warn!(origin, "failed to decode cursor: {}", e);
                    0
                }
            },
            Ok(None) => 0,
            Err(e) => {
                tracing::error!(origin, "failed to read cursor: {}", e);
                0
            }
        }
    }

    async fn write(&self, origin: &str, sent_count: u64) -> Result<(), CursorStoreError> {
        let query = r#"
            INSERT INTO sync_cursors (key, origin, value, updated_at)
            VALUES (?, ?, ?, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
        "#;
        self.connection()
            .execute(
                query,
                libsql::params![cursor_key(origin), origin, sent_count.to_string()],
            )
            .await?;
        Ok(())
    }

    async fn clear(&self, origin: &str) -> Result<(), CursorStoreError> {
        self.connection()
            .execute("DELETE FROM sync_cursors WHERE key = ?", libsql::params![cursor_key(origin)])
            .await?;
        Ok(())
    }
}

/// Cursor store that lives only as long as the process.
#[derive(Default)]
pub struct MemoryCursorStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryCursorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a raw value, bypassing validation.
    #[cfg(test)]
    pub(crate) fn insert_raw(&self, origin: &str, raw: &str) {
        if let Ok(mut values) = self.values.lock() {
            values.insert(cursor_key(origin), raw.to_string());
        }
    }

    pub fn get(&self, origin: &str) -> Option<SyncCursor> {
        let values = self.values.lock().ok()?;
        let raw = values.get(&cursor_key(origin))?;
        Some(SyncCursor {
            origin: origin.to_string(),
            sent_count: parse_count(origin, raw),
        })
    }
}

impl CursorStore for MemoryCursorStore {
    async fn read(&self, origin: &str) -> u64 {
        self.get(origin).map(|cursor| cursor.sent_count).unwrap_or(0)
    }

    async fn write(&self, origin: &str, sent_count: u64) -> Result<(), CursorStoreError> {
        let mut values = self
            .values
            .lock()
            .map_err(|e| CursorStoreError::LockError(e.to_string()))?;
        values.insert(cursor_key(origin), sent_count.to_string());
        Ok(())
    }

    async fn clear(&self, origin: &str) -> Result<(), CursorStoreError> {
        let mut values = self
            .values
            .lock()
            .map_err(|e| CursorStoreError::LockError(e.to_string()))?;
        values.remove(&cursor_key(origin));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_stable_and_distinct() {
        let a = cursor_key("blindtyping.com");
        assert_eq!(a, cursor_key("blindtyping.com"));
        assert_ne!(a, cursor_key("fastfingers.net"));
        assert!(a.starts_with(KEY_PREFIX));
        assert_eq!(a.len(), KEY_PREFIX.len() + 64);
    }

    #[tokio::test]
    async fn memory_store_round_trip() {
        let store = MemoryCursorStore::new();
        assert_eq!(store.read("a.com").await, 0);

        store.write("a.com", 7).await.unwrap();
        store.write("b.com", 2).await.unwrap();
        assert_eq!(store.read("a.com").await, 7);
        assert_eq!(store.read("b.com").await, 2);

        store.clear("a.com").await.unwrap();
        assert_eq!(store.read("a.com").await, 0);
        assert_eq!(store.read("b.com").await, 2);
    }

    #[tokio::test]
    async fn memory_store_treats_garbage_as_zero() {
        let store = MemoryCursorStore::new();
        store.insert_raw("a.com", "NaN");
        assert_eq!(store.read("a.com").await, 0);
        store.insert_raw("a.com", "-3");
        assert_eq!(store.read("a.com").await, 0);
        store.insert_raw("a.com", "12");
        assert_eq!(store.read("a.com").await, 12);
    }

    #[tokio::test]
    async fn database_store_round_trip() {
        let db = Database::in_memory().await.unwrap();
        assert_eq!(db.read("gonki.nabiraem.ru").await, 0);

        db.write("gonki.nabiraem.ru", 3).await.unwrap();
        db.write("gonki.nabiraem.ru", 4).await.unwrap();
        assert_eq!(db.read("gonki.nabiraem.ru").await, 4);
        assert_eq!(db.read("www.speedcoder.net").await, 0);

        db.clear("gonki.nabiraem.ru").await.unwrap();
        assert_eq!(db.read("gonki.nabiraem.ru").await, 0);
        db.clear("never.written").await.unwrap();
    }

    #[tokio::test]
    async fn database_store_treats_garbage_as_zero() {
        let db = Database::in_memory().await.unwrap();
        db.connection()
            .execute(
                "INSERT INTO sync_cursors (key, origin, value, updated_at) VALUES (?, ?, ?, 'now')",
                libsql::params![cursor_key("a.com"), "a.com", "twelve"],
            )
            .await
            .unwrap();
        assert_eq!(db.read("a.com").await, 0);
    }

    #[tokio::test]
    async fn database_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cursors.db");
        let path = path.to_str().unwrap();

        {
            let db = Database::open(path).await.unwrap();
            db.write("fastfingers.net", 42).await.unwrap();
        }
        let db = Database::open(path).await.unwrap();
        assert_eq!(db.read("fastfingers.net").await, 42);
    }
}
