use futures_util::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use super::session_store::SessionStore;

/// Periodically purge expired sessions from `store`.
///
/// The sweep runs outside of any request, so a panic inside it is caught and
/// logged here rather than by the request pipeline. A failed sweep is logged
/// and retried at the next tick.
pub fn spawn_cleanup_task(store: Arc<dyn SessionStore>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            match AssertUnwindSafe(store.delete_expired()).catch_unwind().await {
                Ok(Ok(0)) => {}
                Ok(Ok(removed)) => tracing::debug!(removed, "Purged expired sessions"),
                Ok(Err(e)) => tracing::error!(error = %e, "Expired session sweep failed"),
                Err(panic) => {
                    tracing::error!(
                        panic = %panic_message(panic.as_ref()),
                        "Expired session sweep panicked; stopping cleanup task"
                    );
                    break;
                }
            }
        }
    })
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::errors::StorageError;
    use crate::storage::session_store::InMemorySessionStore;
    use crate::storage::types::SessionRecord;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct PanickingStore {
        sweeps: AtomicUsize,
    }

    #[async_trait]
    impl SessionStore for PanickingStore {
        async fn init(&self) -> Result<(), StorageError> {
            Ok(())
        }
        async fn load(&self, _token: &str) -> Result<Option<SessionRecord>, StorageError> {
            Ok(None)
        }
        async fn save(&self, _: &str, _: &str, _: DateTime<Utc>) -> Result<(), StorageError> {
            Ok(())
        }
        async fn delete(&self, _token: &str) -> Result<(), StorageError> {
            Ok(())
        }
        async fn delete_expired(&self) -> Result<u64, StorageError> {
            self.sweeps.fetch_add(1, Ordering::SeqCst);
            panic!("sweep exploded");
        }
    }

    #[tokio::test]
    async fn test_cleanup_task_purges_expired_sessions() {
        let store = Arc::new(InMemorySessionStore::new());
        store
            .save("dead", "{}", Utc::now() - chrono::Duration::seconds(1))
            .await
            .unwrap();
        store
            .save("live", "{}", Utc::now() + chrono::Duration::hours(1))
            .await
            .unwrap();

        let handle = spawn_cleanup_task(store.clone(), Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.abort();

        assert_eq!(store.entry.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_cleanup_task_contains_panic() {
        let store = Arc::new(PanickingStore {
            sweeps: AtomicUsize::new(0),
        });

        let handle = spawn_cleanup_task(store.clone(), Duration::from_millis(5));
        // The task ends on its own instead of propagating the panic
        assert!(handle.await.is_ok());
        assert_eq!(store.sweeps.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_panic_message() {
        let boxed: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(panic_message(boxed.as_ref()), "boom");
        let boxed: Box<dyn std::any::Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(boxed.as_ref()), "bang");
        let boxed: Box<dyn std::any::Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(boxed.as_ref()), "unknown panic");
    }
}
