use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::storage::errors::StorageError;
use crate::storage::types::SessionRecord;

pub struct InMemorySessionStore {
    pub(crate) entry: Mutex<HashMap<String, SessionRecord>>,
}

pub struct RedisSessionStore {
    pub(super) client: redis::Client,
}

#[derive(Clone, Debug)]
pub struct SqliteSessionStore {
    pub(super) pool: sqlx::SqlitePool,
}

#[derive(Clone, Debug)]
pub struct PostgresSessionStore {
    pub(super) pool: sqlx::PgPool,
}

/// Durable mapping from an opaque session token to serialized session state.
///
/// Implementations must be safe to call concurrently and must never hand back
/// a record whose expiry has passed.
#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    /// Initialize the store. This is called when the store is created.
    async fn init(&self) -> Result<(), StorageError>;

    /// Fetch the unexpired record stored under `token`.
    async fn load(&self, token: &str) -> Result<Option<SessionRecord>, StorageError>;

    /// Insert or replace the record stored under `token`.
    async fn save(
        &self,
        token: &str,
        data: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StorageError>;

    /// Remove `token`. Removing a missing token is not an error.
    async fn delete(&self, token: &str) -> Result<(), StorageError>;

    /// Purge every expired record, returning how many were removed.
    async fn delete_expired(&self) -> Result<u64, StorageError>;
}
