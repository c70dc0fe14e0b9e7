use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::AsyncCommands;

use crate::storage::errors::StorageError;
use crate::storage::types::SessionRecord;

use super::types::{RedisSessionStore, SessionStore};

const SESSION_PREFIX: &str = "session";

impl RedisSessionStore {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }

    fn make_key(token: &str) -> String {
        format!("{SESSION_PREFIX}:{token}")
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn init(&self) -> Result<(), StorageError> {
        // Verify the connection works
        let _conn = self.client.get_multiplexed_async_connection().await?;
        Ok(())
    }

    #[tracing::instrument(skip_all)]
    async fn load(&self, token: &str) -> Result<Option<SessionRecord>, StorageError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let value: Option<String> = conn.get(Self::make_key(token)).await?;

        match value {
            Some(v) => {
                let record: SessionRecord = serde_json::from_str(&v)?;
                Ok((!record.is_expired()).then_some(record))
            }
            None => Ok(None),
        }
    }

    #[tracing::instrument(skip_all, fields(expires_at = %expires_at))]
    async fn save(
        &self,
        token: &str,
        data: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let record = SessionRecord::new(data, expires_at);
        let ttl = record.ttl_seconds();
        if ttl == 0 {
            return self.delete(token).await;
        }

        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let key = Self::make_key(token);
        let value = serde_json::to_string(&record)?;

        // SET and EXPIRE in one transaction so a crash cannot leave an immortal key
        let _: () = redis::pipe()
            .atomic()
            .set(&key, value)
            .ignore()
            .expire(&key, ttl)
            .ignore()
            .query_async(&mut conn)
            .await?;

        Ok(())
    }

    async fn delete(&self, token: &str) -> Result<(), StorageError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let _: () = conn.del(Self::make_key(token)).await?;
        Ok(())
    }

    async fn delete_expired(&self) -> Result<u64, StorageError> {
        // Redis evicts keys on their own TTL
        Ok(0)
    }
}
