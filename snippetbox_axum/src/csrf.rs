use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use http::header::{CONTENT_TYPE, HeaderName, HeaderValue};
use http::Method;

use snippetbox::{CsrfError, Session, issue_csrf_token, verify_csrf_token};

use crate::error::AppError;
use crate::form::{form_pairs, is_form_content_type};
use crate::state::AppState;

/// Result of the CSRF check for the current request.
///
/// The check runs globally but is only enforced by [`reject_forged_request`],
/// which sits behind the authorization gate on dynamic routes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CsrfVerdict(pub Result<(), CsrfError>);

impl CsrfVerdict {
    pub fn is_valid(&self) -> bool {
        self.0.is_ok()
    }
}

fn is_state_changing(method: &Method) -> bool {
    !matches!(
        *method,
        Method::GET | Method::HEAD | Method::OPTIONS | Method::TRACE
    )
}

/// Pull the submitted token out of the header or the form body.
///
/// An empty or non-visible-ASCII header does not count and the form field is
/// used instead.
///
/// The body is buffered and handed back so the handler can still read it.
async fn submitted_token(state: &AppState, req: Request) -> Result<(Request, Option<String>), AppError> {
    let header_token = req
        .headers()
        .get(state.config.csrf_header_name.as_str())
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string);
    if header_token.is_some() {
        return Ok((req, header_token));
    }

    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .filter(|ct| is_form_content_type(ct))
        .map(str::to_string);
    let Some(content_type) = content_type else {
        return Ok((req, None));
    };

    let (parts, body) = req.into_parts();
    let bytes = axum::body::to_bytes(body, state.config.form_body_limit)
        .await
        .map_err(|e| {
            tracing::debug!(error = %e, "Could not buffer form body");
            AppError::BadRequest
        })?;

    // A body the form decoder rejects is reported by the handler, not here
    let token = form_pairs(&content_type, bytes.clone())
        .await
        .ok()
        .and_then(|pairs| {
            pairs
                .into_iter()
                .find(|(name, _)| *name == state.config.csrf_field_name)
                .map(|(_, value)| value)
        });

    Ok((Request::from_parts(parts, Body::from(bytes)), token))
}

/// CSRF stage: verify unsafe requests and mint a fresh masked token for the page.
pub async fn csrf_guard(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let Some(session) = req.extensions().get::<Session>().cloned() else {
        return AppError::server("session stage is not installed").into_response();
    };

    let (mut req, verdict) = if is_state_changing(req.method()) {
        let (req, token) = match submitted_token(&state, req).await {
            Ok(found) => found,
            Err(e) => return e.into_response(),
        };
        let verdict = verify_csrf_token(&session, token.as_deref()).await;
        match verdict {
            Ok(()) => {}
            Err(CsrfError::NoSession) => {
                tracing::info!(uri = %req.uri(), "Unsafe request without a session")
            }
            Err(e) => tracing::warn!(uri = %req.uri(), error = %e, "CSRF token rejected"),
        }
        (req, CsrfVerdict(verdict))
    } else {
        (req, CsrfVerdict(Ok(())))
    };

    let token = if verdict.is_valid() {
        match issue_csrf_token(&session).await {
            Ok(token) => Some(token),
            Err(e) => return AppError::from(e).into_response(),
        }
    } else {
        None
    };

    req.extensions_mut().insert(verdict);
    if let Some(token) = &token {
        req.extensions_mut().insert(token.clone());
    }

    let mut response = next.run(req).await;

    if let Some(token) = token.filter(|_| state.config.respond_with_x_csrf_token) {
        let name = HeaderName::from_bytes(state.config.csrf_header_name.as_bytes());
        let value = HeaderValue::from_str(token.as_str());
        if let (Ok(name), Ok(value)) = (name, value) {
            response.headers_mut().insert(name, value);
        }
    }

    response
}

/// Enforce the verdict recorded by [`csrf_guard`]: a failed check is a 400.
pub async fn reject_forged_request(req: Request, next: Next) -> Response {
    match req.extensions().get::<CsrfVerdict>() {
        Some(CsrfVerdict(Ok(()))) => next.run(req).await,
        Some(CsrfVerdict(Err(e))) => AppError::from(*e).into_response(),
        None => AppError::server("CSRF stage is not installed").into_response(),
    }
}
