use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::session::errors::SessionError;
use crate::session::types::{SessionState, SessionStatus};
use crate::storage::SessionStore;
use crate::utils::gen_random_string;

/// Bytes of entropy in a session token
pub(crate) const TOKEN_BYTES: usize = 32;

/// Request-scoped handle to the caller's session.
///
/// Cloning is cheap and every clone sees the same state. Mutations stay in
/// memory until [`SessionManager::commit`](super::SessionManager::commit)
/// writes them back once the response is ready.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    state: Mutex<SessionState>,
    store: Arc<dyn SessionStore>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").finish_non_exhaustive()
    }
}

impl Session {
    pub(crate) fn new(state: SessionState, store: Arc<dyn SessionStore>) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                state: Mutex::new(state),
                store,
            }),
        }
    }

    pub(crate) async fn state(&self) -> tokio::sync::MutexGuard<'_, SessionState> {
        self.inner.state.lock().await
    }

    pub(crate) fn store(&self) -> &Arc<dyn SessionStore> {
        &self.inner.store
    }

    /// Token currently bound to this session, `None` when nothing has been stored yet.
    pub async fn token(&self) -> Option<String> {
        self.state().await.token.clone()
    }

    pub async fn status(&self) -> SessionStatus {
        self.state().await.status
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.state().await.values.contains_key(key)
    }

    /// Deserialize the value stored under `key`.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, SessionError> {
        match self.state().await.values.get(key) {
            Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
            None => Ok(None),
        }
    }

    /// Integer value under `key`; values of any other type read as absent.
    pub async fn get_i64(&self, key: &str) -> Option<i64> {
        self.state().await.values.get(key).and_then(Value::as_i64)
    }

    pub async fn get_string(&self, key: &str) -> Option<String> {
        self.state()
            .await
            .values
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    pub async fn put<T: Serialize>(&self, key: &str, value: T) -> Result<(), SessionError> {
        let value = serde_json::to_value(value)?;
        let mut state = self.state().await;
        state.values.insert(key.to_string(), value);
        state.status = SessionStatus::Modified;
        Ok(())
    }

    /// Remove `key`. The session is only marked modified if the key existed.
    pub async fn remove(&self, key: &str) {
        let mut state = self.state().await;
        if state.values.remove(key).is_some() {
            state.status = SessionStatus::Modified;
        }
    }

    /// Read and remove a string value in one step, as used for flash messages.
    pub async fn pop_string(&self, key: &str) -> Option<String> {
        let mut state = self.state().await;
        let value = state.values.remove(key)?;
        state.status = SessionStatus::Modified;
        value.as_str().map(str::to_string)
    }

    /// Move the session data to a freshly generated token.
    ///
    /// The old token is deleted from the store before this returns, so it can
    /// no longer load the session even though the data is only written under
    /// the new token at commit.
    #[tracing::instrument(skip_all)]
    pub async fn renew_token(&self) -> Result<(), SessionError> {
        let mut state = self.state().await;

        if let Some(old) = state.token.take() {
            self.inner.store.delete(&old).await?;
        }

        state.token = Some(gen_random_string(TOKEN_BYTES)?);
        state.status = SessionStatus::Modified;

        tracing::debug!("Session token renewed");
        Ok(())
    }

    /// Delete the session from the store and drop all of its data.
    #[tracing::instrument(skip_all)]
    pub async fn destroy(&self) -> Result<(), SessionError> {
        let mut state = self.state().await;

        if let Some(old) = state.token.take() {
            self.inner.store.delete(&old).await?;
        }

        state.values.clear();
        state.status = SessionStatus::Destroyed;
        Ok(())
    }
}
