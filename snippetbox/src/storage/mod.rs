mod cleanup;
mod errors;
mod session_store;
mod types;

pub use cleanup::spawn_cleanup_task;
pub use errors::StorageError;
pub use session_store::{
    InMemorySessionStore, PostgresSessionStore, RedisSessionStore, SESSION_CLEANUP_INTERVAL,
    SessionStore, SqliteSessionStore, store_from_env,
};
pub use types::SessionRecord;
