use std::{str::FromStr, sync::Arc, sync::LazyLock};

use crate::config::{env_parse, env_string};
use crate::storage::errors::StorageError;

use super::types::{
    InMemorySessionStore, PostgresSessionStore, RedisSessionStore, SessionStore,
    SqliteSessionStore,
};

/// Backend kind: "memory", "redis", "sqlite" or "postgres"
pub(crate) static SESSION_STORE_TYPE: LazyLock<String> =
    LazyLock::new(|| env_string("SESSION_STORE_TYPE", "memory"));

pub(crate) static SESSION_STORE_URL: LazyLock<String> =
    LazyLock::new(|| env_string("SESSION_STORE_URL", "memory"));

/// Seconds between expired-session sweeps
/// Default: 300 (5 minutes)
pub static SESSION_CLEANUP_INTERVAL: LazyLock<u64> =
    LazyLock::new(|| env_parse("SESSION_CLEANUP_INTERVAL", 300));

/// Sessions table name for the SQL backends
pub(crate) static DB_TABLE_SESSIONS: LazyLock<String> =
    LazyLock::new(|| env_string("DB_TABLE_SESSIONS", "sessions"));

/// Build and initialize the session store selected by `SESSION_STORE_TYPE`.
pub async fn store_from_env() -> Result<Arc<dyn SessionStore>, StorageError> {
    build_store(SESSION_STORE_TYPE.as_str(), SESSION_STORE_URL.as_str()).await
}

pub(crate) async fn build_store(
    store_type: &str,
    store_url: &str,
) -> Result<Arc<dyn SessionStore>, StorageError> {
    tracing::info!(store_type, "Initializing session store");

    let store: Arc<dyn SessionStore> = match store_type {
        "memory" => Arc::new(InMemorySessionStore::new()),
        "redis" => {
            let client = redis::Client::open(store_url)?;
            Arc::new(RedisSessionStore::new(client))
        }
        "sqlite" => {
            let opts = sqlx::sqlite::SqliteConnectOptions::from_str(store_url)?
                .create_if_missing(true);
            Arc::new(SqliteSessionStore::new(
                sqlx::sqlite::SqlitePool::connect_lazy_with(opts),
            ))
        }
        "postgres" => Arc::new(PostgresSessionStore::new(sqlx::PgPool::connect_lazy(
            store_url,
        )?)),
        t => {
            return Err(StorageError::Config(format!(
                "Unsupported session store type: {t}. Supported types are 'memory', 'redis', 'sqlite' and 'postgres'"
            )));
        }
    };

    store.init().await?;

    tracing::info!(store_type, "Connected to session store");
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn test_build_memory_store() {
        let store = build_store("memory", "memory").await.unwrap();
        store
            .save("tok", "{}", Utc::now() + Duration::minutes(1))
            .await
            .unwrap();
        assert!(store.load("tok").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_build_sqlite_store() {
        let store = build_store("sqlite", "sqlite::memory:").await;
        assert!(store.is_ok());
    }

    #[tokio::test]
    async fn test_unsupported_store_type() {
        match build_store("cassandra", "whatever").await {
            Err(StorageError::Config(msg)) => assert!(msg.contains("cassandra")),
            Err(other) => panic!("Expected Config error, got {other:?}"),
            Ok(_) => panic!("Expected an error"),
        }
    }

    #[tokio::test]
    async fn test_invalid_redis_url() {
        assert!(build_store("redis", "not a url").await.is_err());
    }
}
