//! snippetbox - session, CSRF and form-validation core for server-rendered web applications
//!
//! This crate holds the framework-independent half of the request pipeline:
//! server-side sessions with pluggable stores, masked CSRF tokens, identity
//! resolution against a user collaborator, and the form decode/validate bridge.
//! The `snippetbox-axum` crate wires these into axum middleware.

mod config;
mod form;
mod session;
mod snippets;
mod storage;
mod userdb;
mod utils;
mod validator;

pub use config::FORM_BODY_LIMIT;

pub use form::{FieldSetter, FieldTable, FormError, FormShape, decode_form, parse_urlencoded};

pub use session::{
    AUTHENTICATED_USER_ID, CsrfError, CsrfToken, Identity, SESSION_COOKIE_NAME,
    SESSION_COOKIE_SECURE, SESSION_LIFETIME, Session, SessionConfig, SessionError, SessionManager,
    SessionStatus, issue_csrf_token, log_in, log_out, resolve_identity, verify_csrf_token,
};

pub use snippets::{MemorySnippetStore, Snippet, SnippetError, SnippetStore};

pub use storage::{
    InMemorySessionStore, PostgresSessionStore, RedisSessionStore, SESSION_CLEANUP_INTERVAL,
    SessionRecord, SessionStore, SqliteSessionStore, StorageError, spawn_cleanup_task,
    store_from_env,
};

pub use userdb::{MemoryUserStore, User, UserError, UserStore};

pub use utils::{UtilError, gen_random_string};

pub use validator::{
    Validator, is_valid_email, matches, max_chars, min_chars, not_blank, permitted_value,
};
