use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::BTreeMap;

/// Where a request's session stands relative to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Nothing to write back
    Unmodified,
    /// Data or token changed; saved and cookie reissued at commit
    Modified,
    /// Deleted from the store; the cookie is cleared at commit
    Destroyed,
}

/// Request-scoped view of one session.
#[derive(Debug, Clone)]
pub(crate) struct SessionState {
    /// `None` until the session is first written
    pub(crate) token: Option<String>,
    pub(crate) values: BTreeMap<String, Value>,
    pub(crate) expires_at: DateTime<Utc>,
    pub(crate) status: SessionStatus,
}

impl SessionState {
    pub(crate) fn fresh(expires_at: DateTime<Utc>) -> Self {
        Self {
            token: None,
            values: BTreeMap::new(),
            expires_at,
            status: SessionStatus::Unmodified,
        }
    }

    pub(crate) fn loaded(
        token: String,
        values: BTreeMap<String, Value>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            token: Some(token),
            values,
            expires_at,
            status: SessionStatus::Unmodified,
        }
    }
}

/// A user whose session id was confirmed against the identity store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user_id: i64,
}
