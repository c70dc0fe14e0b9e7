//! Helpers for reading process configuration from environment variables

use std::env;
use std::str::FromStr;
use std::sync::LazyLock;

/// Upper bound on a buffered form body, in bytes
/// Default: 1 MiB
pub static FORM_BODY_LIMIT: LazyLock<usize> =
    LazyLock::new(|| env_parse("FORM_BODY_LIMIT", 1024 * 1024));

/// Parse an environment variable, falling back to `default` when it is unset or invalid.
pub(crate) fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

/// Any value other than "false" or "0" (case-insensitive) is treated as true.
pub(crate) fn env_flag(key: &str, default: bool) -> bool {
    env::var(key)
        .map(|val| {
            let val = val.trim().to_lowercase();
            val != "false" && val != "0"
        })
        .unwrap_or(default)
}

pub(crate) fn env_string(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
