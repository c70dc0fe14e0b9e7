use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Serialized session state as held by a [`SessionStore`](super::SessionStore)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionRecord {
    pub data: String,
    pub expires_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn new(data: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            data: data.into(),
            expires_at,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }

    /// Remaining lifetime in whole seconds, never negative.
    pub fn ttl_seconds(&self) -> i64 {
        (self.expires_at - Utc::now()).num_seconds().max(0)
    }
}
