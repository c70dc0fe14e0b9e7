//! Shared fixtures for the crate's unit tests
//!
//! Everything runs against the in-memory stores with an explicit
//! configuration, so no test depends on the process environment.

use async_trait::async_trait;
use chrono::Duration;
use std::sync::Arc;

use snippetbox::{
    InMemorySessionStore, MemorySnippetStore, MemoryUserStore, SessionConfig, SessionManager,
    UserError, UserStore,
};

use crate::config::PipelineConfig;
use crate::state::AppState;

pub(crate) fn test_pipeline_config() -> PipelineConfig {
    PipelineConfig {
        login_url: "/user/login".to_string(),
        csrf_field_name: "csrf_token".to_string(),
        csrf_header_name: "X-CSRF-Token".to_string(),
        respond_with_x_csrf_token: true,
        server_header: "snippetbox".to_string(),
        form_body_limit: 1024 * 1024,
    }
}

pub(crate) fn test_session_manager() -> SessionManager {
    SessionManager::new(
        Arc::new(InMemorySessionStore::new()),
        SessionConfig {
            cookie_name: "session".to_string(),
            lifetime: Duration::hours(12),
            cookie_secure: true,
        },
    )
}

/// State plus a handle on its user store for seeding accounts.
pub(crate) fn test_state_with_users() -> (AppState, Arc<MemoryUserStore>) {
    let users = Arc::new(MemoryUserStore::new());
    let state = AppState::new(
        test_session_manager(),
        users.clone(),
        Arc::new(MemorySnippetStore::new()),
        test_pipeline_config(),
    );
    (state, users)
}

pub(crate) fn test_state() -> AppState {
    test_state_with_users().0
}

/// A user store whose backend is always down.
pub(crate) struct FailingUserStore;

#[async_trait]
impl UserStore for FailingUserStore {
    async fn insert(&self, _: &str, _: &str, _: &str) -> Result<i64, UserError> {
        Err(UserError::Storage("user database unreachable".to_string()))
    }

    async fn authenticate(&self, _: &str, _: &str) -> Result<i64, UserError> {
        Err(UserError::Storage("user database unreachable".to_string()))
    }

    async fn exists(&self, _: i64) -> Result<bool, UserError> {
        Err(UserError::Storage("user database unreachable".to_string()))
    }
}
