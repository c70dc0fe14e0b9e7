use subtle::ConstantTimeEq;

use crate::session::errors::{CsrfError, SessionError};
use crate::utils::{base64url_decode, base64url_encode, gen_random_bytes};

use super::session::Session;

/// Session key holding the per-session CSRF secret
pub(crate) const CSRF_SECRET_KEY: &str = "__csrf_secret";

const SECRET_LEN: usize = 32;

/// A masked presentation of the session's CSRF secret.
///
/// Every call to [`issue_csrf_token`] yields a different value for the same
/// secret, and each of them verifies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrfToken(String);

impl CsrfToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CsrfToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

async fn stored_secret(session: &Session) -> Option<Vec<u8>> {
    let encoded = session.get_string(CSRF_SECRET_KEY).await?;
    base64url_decode(&encoded)
        .ok()
        .filter(|secret| secret.len() == SECRET_LEN)
}

/// Mask the session's CSRF secret for embedding in a response, creating the
/// secret first if the session has none.
pub async fn issue_csrf_token(session: &Session) -> Result<CsrfToken, SessionError> {
    let secret = match stored_secret(session).await {
        Some(secret) => secret,
        None => {
            let secret = gen_random_bytes(SECRET_LEN)?;
            session
                .put(CSRF_SECRET_KEY, base64url_encode(&secret))
                .await?;
            secret
        }
    };

    Ok(CsrfToken(mask(&secret)?))
}

/// Check a submitted token against the session's CSRF secret.
pub async fn verify_csrf_token(session: &Session, submitted: Option<&str>) -> Result<(), CsrfError> {
    if session.token().await.is_none() {
        return Err(CsrfError::NoSession);
    }

    let secret = stored_secret(session).await.ok_or(CsrfError::NoSecret)?;

    let submitted = submitted
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(CsrfError::MissingToken)?;

    let presented = unmask(submitted)?;

    if bool::from(presented.as_slice().ct_eq(secret.as_slice())) {
        Ok(())
    } else {
        Err(CsrfError::Mismatch)
    }
}

/// `pad || (pad XOR secret)`, base64url encoded
fn mask(secret: &[u8]) -> Result<String, SessionError> {
    let pad = gen_random_bytes(secret.len())?;
    let mut masked = Vec::with_capacity(secret.len() * 2);
    masked.extend_from_slice(&pad);
    masked.extend(pad.iter().zip(secret).map(|(p, s)| p ^ s));
    Ok(base64url_encode(&masked))
}

fn unmask(token: &str) -> Result<Vec<u8>, CsrfError> {
    let raw = base64url_decode(token).map_err(|_| CsrfError::MalformedToken)?;
    if raw.len() != SECRET_LEN * 2 {
        return Err(CsrfError::MalformedToken);
    }

    let (pad, masked) = raw.split_at(SECRET_LEN);
    Ok(pad.iter().zip(masked).map(|(p, m)| p ^ m).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::types::SessionState;
    use crate::storage::{InMemorySessionStore, SessionStore};
    use chrono::{Duration, Utc};
    use std::sync::Arc;

    fn stored_session() -> Session {
        let store: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
        let token = crate::utils::gen_random_string(32).unwrap();
        Session::new(
            SessionState::loaded(token, Default::default(), Utc::now() + Duration::hours(1)),
            store,
        )
    }

    fn flip_bit(token: &str) -> String {
        let mut raw = base64url_decode(token).unwrap();
        raw[40] ^= 0x01;
        base64url_encode(&raw)
    }

    #[tokio::test]
    async fn test_issued_token_verifies() {
        let session = stored_session();
        let token = issue_csrf_token(&session).await.unwrap();

        assert!(verify_csrf_token(&session, Some(token.as_str())).await.is_ok());
    }

    #[tokio::test]
    async fn test_tokens_differ_per_issue_but_share_secret() {
        let session = stored_session();
        let first = issue_csrf_token(&session).await.unwrap();
        let second = issue_csrf_token(&session).await.unwrap();

        assert_ne!(first, second);
        assert!(verify_csrf_token(&session, Some(first.as_str())).await.is_ok());
        assert!(verify_csrf_token(&session, Some(second.as_str())).await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_token_rejected() {
        let session = stored_session();
        issue_csrf_token(&session).await.unwrap();

        assert_eq!(
            verify_csrf_token(&session, None).await,
            Err(CsrfError::MissingToken)
        );
        assert_eq!(
            verify_csrf_token(&session, Some("  ")).await,
            Err(CsrfError::MissingToken)
        );
    }

    #[tokio::test]
    async fn test_token_from_other_session_rejected() {
        let session = stored_session();
        let other = stored_session();
        issue_csrf_token(&session).await.unwrap();
        let foreign = issue_csrf_token(&other).await.unwrap();

        assert_eq!(
            verify_csrf_token(&session, Some(foreign.as_str())).await,
            Err(CsrfError::Mismatch)
        );
    }

    #[tokio::test]
    async fn test_bit_flipped_token_rejected() {
        let session = stored_session();
        let token = issue_csrf_token(&session).await.unwrap();

        assert_eq!(
            verify_csrf_token(&session, Some(&flip_bit(token.as_str()))).await,
            Err(CsrfError::Mismatch)
        );
    }

    #[tokio::test]
    async fn test_malformed_token_rejected() {
        let session = stored_session();
        issue_csrf_token(&session).await.unwrap();

        assert_eq!(
            verify_csrf_token(&session, Some("!!not base64!!")).await,
            Err(CsrfError::MalformedToken)
        );
        assert_eq!(
            verify_csrf_token(&session, Some(&base64url_encode(&[0u8; 10]))).await,
            Err(CsrfError::MalformedToken)
        );
    }

    #[tokio::test]
    async fn test_session_without_secret_rejected() {
        let session = stored_session();
        let other = stored_session();
        let token = issue_csrf_token(&other).await.unwrap();

        assert_eq!(
            verify_csrf_token(&session, Some(token.as_str())).await,
            Err(CsrfError::NoSecret)
        );
    }

    #[tokio::test]
    async fn test_unsaved_session_rejected_as_no_session() {
        let store: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
        let session = Session::new(SessionState::fresh(Utc::now() + Duration::hours(1)), store);
        let token = issue_csrf_token(&session).await.unwrap();

        assert_eq!(
            verify_csrf_token(&session, Some(token.as_str())).await,
            Err(CsrfError::NoSession)
        );
    }

    #[test]
    fn test_mask_unmask() {
        let secret = gen_random_bytes(SECRET_LEN).unwrap();
        let token = mask(&secret).unwrap();
        assert_eq!(unmask(&token).unwrap(), secret);
    }
}
