use thiserror::Error;

use crate::storage::StorageError;
use crate::userdb::UserError;
use crate::utils::UtilError;

#[derive(Debug, Error, Clone)]
pub enum SessionError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Session data error: {0}")]
    Serde(String),

    #[error("Cookie error: {0}")]
    Cookie(String),

    /// Error from utils operations
    #[error("Utils error: {0}")]
    Utils(#[from] UtilError),

    /// Error from the identity collaborator
    #[error("User error: {0}")]
    User(#[from] UserError),
}

impl From<serde_json::Error> for SessionError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}

/// Reasons a state-changing request fails CSRF verification.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CsrfError {
    #[error("No session is associated with the request")]
    NoSession,

    #[error("Session holds no CSRF secret")]
    NoSecret,

    #[error("No CSRF token was submitted")]
    MissingToken,

    #[error("Submitted CSRF token is malformed")]
    MalformedToken,

    #[error("Submitted CSRF token does not match")]
    Mismatch,
}
