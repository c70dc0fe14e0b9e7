use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::storage::errors::StorageError;
use crate::storage::types::SessionRecord;

use super::config::DB_TABLE_SESSIONS;
use super::types::{SessionStore, SqliteSessionStore};

impl SqliteSessionStore {
    pub fn new(pool: sqlx::SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn init(&self) -> Result<(), StorageError> {
        let table_name = DB_TABLE_SESSIONS.as_str();

        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {table_name} (
                token TEXT PRIMARY KEY,
                data TEXT NOT NULL,
                expiry TIMESTAMP NOT NULL
            )
            "#
        ))
        .execute(&self.pool)
        .await?;

        sqlx::query(&format!(
            r#"
            CREATE INDEX IF NOT EXISTS {table_name}_expiry_idx ON {table_name} (expiry)
            "#
        ))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip_all)]
    async fn load(&self, token: &str) -> Result<Option<SessionRecord>, StorageError> {
        let table_name = DB_TABLE_SESSIONS.as_str();

        let row = sqlx::query_as::<_, (String, DateTime<Utc>)>(&format!(
            r#"
            SELECT data, expiry FROM {table_name} WHERE token = ? AND expiry > ?
            "#
        ))
        .bind(token)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(data, expires_at)| SessionRecord::new(data, expires_at)))
    }

    #[tracing::instrument(skip_all, fields(expires_at = %expires_at))]
    async fn save(
        &self,
        token: &str,
        data: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let table_name = DB_TABLE_SESSIONS.as_str();

        sqlx::query(&format!(
            r#"
            INSERT INTO {table_name} (token, data, expiry)
            VALUES (?, ?, ?)
            ON CONFLICT (token) DO UPDATE SET
                data = excluded.data,
                expiry = excluded.expiry
            "#
        ))
        .bind(token)
        .bind(data)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, token: &str) -> Result<(), StorageError> {
        let table_name = DB_TABLE_SESSIONS.as_str();

        sqlx::query(&format!(
            r#"
            DELETE FROM {table_name} WHERE token = ?
            "#
        ))
        .bind(token)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_expired(&self) -> Result<u64, StorageError> {
        let table_name = DB_TABLE_SESSIONS.as_str();

        let result = sqlx::query(&format!(
            r#"
            DELETE FROM {table_name} WHERE expiry <= ?
            "#
        ))
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
