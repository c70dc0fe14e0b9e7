//! snippetbox-axum - axum middleware chain and pages for the snippetbox core
//!
//! [`app`] assembles the whole pipeline. The individual stages are exported
//! for applications that want to compose their own router.

mod auth;
mod config;
mod csrf;
mod error;
mod form;
mod middleware;
mod pages;
mod router;
mod session;
mod state;

#[cfg(test)]
mod test_utils;

pub use auth::{AuthContext, authenticate, require_authentication};
pub use config::{
    CSRF_FIELD_NAME, CSRF_HEADER_NAME, LOGIN_URL, PipelineConfig, RESPOND_WITH_X_CSRF_TOKEN,
    SERVER_HEADER,
};
pub use csrf::{CsrfVerdict, csrf_guard, reject_forged_request};
pub use error::{AppError, ServerFault};
pub use form::PostForm;
pub use middleware::{common_headers, log_request, recover_panic};
pub use router::app;
pub use session::load_session;
pub use state::AppState;
