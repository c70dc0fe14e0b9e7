use chrono::Utc;
use http::{HeaderMap, HeaderValue};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::session::config::SessionConfig;
use crate::session::errors::SessionError;
use crate::session::types::{SessionState, SessionStatus};
use crate::storage::SessionStore;
use crate::utils::gen_random_string;

use super::cookie::{clearing_cookie, is_well_formed_token, session_cookie, session_token_from_headers};
use super::session::{Session, TOKEN_BYTES};

/// Loads sessions at the start of a request and writes them back at the end.
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    config: SessionConfig,
}

impl SessionManager {
    pub fn new(store: Arc<dyn SessionStore>, config: SessionConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    /// Session identified by the request's cookie, or an empty one.
    ///
    /// A missing, malformed, unknown or expired token all start an empty
    /// session. Only store failures are errors.
    #[tracing::instrument(skip_all)]
    pub async fn load(&self, headers: &HeaderMap) -> Result<Session, SessionError> {
        let Some(token) = session_token_from_headers(headers, &self.config.cookie_name) else {
            return Ok(self.empty());
        };

        if !is_well_formed_token(&token) {
            tracing::debug!("Ignoring malformed session token");
            return Ok(self.empty());
        }

        let Some(record) = self.store.load(&token).await? else {
            tracing::debug!("Session token not found or expired");
            return Ok(self.empty());
        };

        if record.is_expired() {
            return Ok(self.empty());
        }

        let values: BTreeMap<String, serde_json::Value> = serde_json::from_str(&record.data)?;
        Ok(Session::new(
            SessionState::loaded(token, values, record.expires_at),
            self.store.clone(),
        ))
    }

    fn empty(&self) -> Session {
        Session::new(
            SessionState::fresh(Utc::now() + self.config.lifetime),
            self.store.clone(),
        )
    }

    /// Persist any changes made during the request.
    ///
    /// Returns the `Set-Cookie` value to send, if the cookie has to change.
    /// An unmodified session performs no store write.
    #[tracing::instrument(skip_all)]
    pub async fn commit(&self, session: &Session) -> Result<Option<HeaderValue>, SessionError> {
        let mut state = session.state().await;

        match state.status {
            SessionStatus::Unmodified => Ok(None),
            SessionStatus::Destroyed => Ok(Some(clearing_cookie(
                &self.config.cookie_name,
                self.config.cookie_secure,
            )?)),
            SessionStatus::Modified => {
                // A session emptied out after being destroyed starts a new lifetime
                if state.token.is_none() && state.expires_at <= Utc::now() {
                    state.expires_at = Utc::now() + self.config.lifetime;
                }

                let token = match &state.token {
                    Some(token) => token.clone(),
                    None => {
                        let token = gen_random_string(TOKEN_BYTES)?;
                        state.token = Some(token.clone());
                        token
                    }
                };

                let data = serde_json::to_string(&state.values)?;
                session
                    .store()
                    .save(&token, &data, state.expires_at)
                    .await?;

                let max_age = (state.expires_at - Utc::now()).num_seconds().max(0);
                state.status = SessionStatus::Unmodified;

                Ok(Some(session_cookie(
                    &self.config.cookie_name,
                    &token,
                    max_age,
                    self.config.cookie_secure,
                )?))
            }
        }
    }
}
