mod config;
mod memory;
mod postgres;
mod redis;
mod sqlite;
mod types;

pub use config::{SESSION_CLEANUP_INTERVAL, store_from_env};
pub use types::{
    InMemorySessionStore, PostgresSessionStore, RedisSessionStore, SessionStore,
    SqliteSessionStore,
};
