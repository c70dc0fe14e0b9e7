use headers::{Cookie, HeaderMapExt};
use http::{HeaderMap, HeaderValue};

use crate::session::errors::SessionError;

/// Length of an unpadded base64url encoding of a 32-byte token
const TOKEN_LEN: usize = 43;

/// Value of the cookie named `cookie_name`, if the request carries one.
pub(crate) fn session_token_from_headers(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let Some(cookies) = headers.typed_get::<Cookie>() else {
        tracing::trace!("No cookie header found");
        return None;
    };

    let token = cookies.get(cookie_name).map(str::to_string);
    if token.is_none() {
        tracing::trace!("No session cookie '{}' found in cookies", cookie_name);
    }
    token
}

/// A presented token must look exactly like one this crate issued.
pub(crate) fn is_well_formed_token(token: &str) -> bool {
    token.len() == TOKEN_LEN
        && token
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

pub(crate) fn session_cookie(
    name: &str,
    value: &str,
    max_age: i64,
    secure: bool,
) -> Result<HeaderValue, SessionError> {
    let mut cookie = format!("{name}={value}; Path=/; Max-Age={max_age}; HttpOnly; SameSite=Lax");
    if secure {
        cookie.push_str("; Secure");
    }

    cookie
        .parse()
        .map_err(|_| SessionError::Cookie("Failed to build session cookie".to_string()))
}

/// Cookie that instructs the browser to forget the session.
pub(crate) fn clearing_cookie(name: &str, secure: bool) -> Result<HeaderValue, SessionError> {
    session_cookie(name, "", 0, secure)
}
