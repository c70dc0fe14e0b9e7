mod config;
mod errors;
mod main;
mod types;

pub use config::{SESSION_COOKIE_NAME, SESSION_COOKIE_SECURE, SESSION_LIFETIME, SessionConfig};
pub use errors::{CsrfError, SessionError};
pub use main::{
    AUTHENTICATED_USER_ID, CsrfToken, Session, SessionManager, issue_csrf_token, log_in, log_out,
    resolve_identity, verify_csrf_token,
};
pub use types::{Identity, SessionStatus};
