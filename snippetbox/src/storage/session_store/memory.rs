use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::storage::errors::StorageError;
use crate::storage::types::SessionRecord;

use super::types::{InMemorySessionStore, SessionStore};

impl InMemorySessionStore {
    pub fn new() -> Self {
        tracing::info!("Creating new in-memory session store");
        Self {
            entry: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn init(&self) -> Result<(), StorageError> {
        Ok(()) // Nothing to initialize for in-memory store
    }

    async fn load(&self, token: &str) -> Result<Option<SessionRecord>, StorageError> {
        let mut entry = self.entry.lock().await;

        // Expired records are dropped on read so a stale token can never resurrect
        match entry.get(token) {
            Some(record) if record.is_expired() => {
                entry.remove(token);
                Ok(None)
            }
            Some(record) => Ok(Some(record.clone())),
            None => Ok(None),
        }
    }

    async fn save(
        &self,
        token: &str,
        data: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        self.entry
            .lock()
            .await
            .insert(token.to_string(), SessionRecord::new(data, expires_at));
        Ok(())
    }

    async fn delete(&self, token: &str) -> Result<(), StorageError> {
        self.entry.lock().await.remove(token);
        Ok(())
    }

    async fn delete_expired(&self) -> Result<u64, StorageError> {
        let mut entry = self.entry.lock().await;
        let before = entry.len();
        entry.retain(|_, record| !record.is_expired());
        Ok((before - entry.len()) as u64)
    }
}
