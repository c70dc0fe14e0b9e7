//! Central configuration for the snippetbox-axum pipeline

use std::sync::LazyLock;

/// Where the authorization gate sends anonymous visitors
/// Default: "/user/login"
pub static LOGIN_URL: LazyLock<String> =
    LazyLock::new(|| std::env::var("LOGIN_URL").unwrap_or_else(|_| "/user/login".to_string()));

/// Name of the hidden form field carrying the masked CSRF token
/// Default: "csrf_token"
pub static CSRF_FIELD_NAME: LazyLock<String> = LazyLock::new(|| {
    std::env::var("CSRF_FIELD_NAME").unwrap_or_else(|_| "csrf_token".to_string())
});

/// Request header script clients may use instead of the form field
/// Default: "X-CSRF-Token"
pub static CSRF_HEADER_NAME: LazyLock<String> = LazyLock::new(|| {
    std::env::var("CSRF_HEADER_NAME").unwrap_or_else(|_| "X-CSRF-Token".to_string())
});

pub static RESPOND_WITH_X_CSRF_TOKEN: LazyLock<bool> = LazyLock::new(|| {
    std::env::var("RESPOND_WITH_X_CSRF_TOKEN")
        .map(|val| val.to_lowercase() != "false")
        .unwrap_or(true)
});

/// Value of the `Server` response header
/// Default: "snippetbox"
pub static SERVER_HEADER: LazyLock<String> =
    LazyLock::new(|| std::env::var("SERVER_HEADER").unwrap_or_else(|_| "snippetbox".to_string()));

/// Settings the middleware chain reads on every request.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub login_url: String,
    pub csrf_field_name: String,
    pub csrf_header_name: String,
    pub respond_with_x_csrf_token: bool,
    pub server_header: String,
    pub form_body_limit: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            login_url: LOGIN_URL.clone(),
            csrf_field_name: CSRF_FIELD_NAME.clone(),
            csrf_header_name: CSRF_HEADER_NAME.clone(),
            respond_with_x_csrf_token: *RESPOND_WITH_X_CSRF_TOKEN,
            server_header: SERVER_HEADER.clone(),
            form_body_limit: *snippetbox::FORM_BODY_LIMIT,
        }
    }
}
