mod cookie;
mod csrf;
mod identity;
mod manager;
mod session;

pub use csrf::{CsrfToken, issue_csrf_token, verify_csrf_token};
pub use identity::{AUTHENTICATED_USER_ID, log_in, log_out, resolve_identity};
pub use manager::SessionManager;
pub use session::Session;
