use chrono::Duration;
use std::sync::LazyLock;

use crate::config::{env_flag, env_parse, env_string};

pub static SESSION_COOKIE_NAME: LazyLock<String> =
    LazyLock::new(|| env_string("SESSION_COOKIE_NAME", "session"));

/// Absolute session lifetime in seconds
/// Default: 43200 (12 hours)
pub static SESSION_LIFETIME: LazyLock<u64> =
    LazyLock::new(|| env_parse("SESSION_LIFETIME", 12 * 60 * 60));

/// Whether the session cookie carries the `Secure` attribute
/// Default: true
pub static SESSION_COOKIE_SECURE: LazyLock<bool> =
    LazyLock::new(|| env_flag("SESSION_COOKIE_SECURE", true));

/// Longest lifetime honored; browsers cap cookie Max-Age at 400 days anyway
const MAX_SESSION_LIFETIME_SECS: u64 = 400 * 24 * 60 * 60;

fn lifetime_from_secs(secs: u64) -> Duration {
    let clamped = secs.min(MAX_SESSION_LIFETIME_SECS);
    if clamped < secs {
        tracing::warn!(secs, clamped, "SESSION_LIFETIME too large, clamping");
    }
    Duration::seconds(clamped as i64)
}

/// Cookie and lifetime settings carried by a [`SessionManager`](super::SessionManager).
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub lifetime: Duration,
    pub cookie_secure: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: SESSION_COOKIE_NAME.clone(),
            lifetime: lifetime_from_secs(*SESSION_LIFETIME),
            cookie_secure: *SESSION_COOKIE_SECURE,
        }
    }
}
