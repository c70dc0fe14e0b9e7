use axum::response::{IntoResponse, Response};
use http::{StatusCode, header};
use std::backtrace::Backtrace;
use std::sync::Arc;

use snippetbox::{CsrfError, FormError, SessionError, SnippetError, UserError};

/// Fault detail attached to a 500 response for the recovery stage to log.
///
/// Never leaves the process: the recovery stage strips it before the
/// response is written.
#[derive(Clone, Debug)]
pub struct ServerFault {
    pub detail: String,
    pub backtrace: Arc<Backtrace>,
}

/// Errors a handler or middleware stage can answer with.
#[derive(Debug)]
pub enum AppError {
    /// Malformed submission or failed CSRF check
    BadRequest,
    NotFound,
    /// Infrastructure fault; logged by the recovery stage, generic body for the client
    Server(ServerFault),
}

impl AppError {
    pub fn server(detail: impl std::fmt::Display) -> Self {
        Self::Server(ServerFault {
            detail: detail.to_string(),
            backtrace: Arc::new(Backtrace::force_capture()),
        })
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = status.canonical_reason().unwrap_or("Error");

        let mut response = (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            body,
        )
            .into_response();

        if let Self::Server(fault) = self {
            response.extensions_mut().insert(fault);
        }
        response
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        Self::server(err)
    }
}

impl From<CsrfError> for AppError {
    fn from(_: CsrfError) -> Self {
        Self::BadRequest
    }
}

impl From<FormError> for AppError {
    fn from(err: FormError) -> Self {
        match err {
            FormError::Malformed(_) => Self::BadRequest,
            FormError::Programmer(_) => Self::server(err),
        }
    }
}

impl From<SnippetError> for AppError {
    fn from(err: SnippetError) -> Self {
        match err {
            SnippetError::NoRecord => Self::NotFound,
            SnippetError::Storage(_) => Self::server(err),
        }
    }
}

/// Expected user outcomes (bad credentials, duplicate email) are handled by
/// the pages; anything reaching this conversion is a fault.
impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        Self::server(err)
    }
}

/// Helper trait for converting foreign errors into an [`AppError`]
pub(crate) trait IntoResponseError<T> {
    fn into_response_error(self) -> Result<T, AppError>;
}

/// Template rendering failures are faults
impl<T> IntoResponseError<T> for Result<T, askama::Error> {
    fn into_response_error(self) -> Result<T, AppError> {
        self.map_err(AppError::server)
    }
}

/// Implementation for http::Error (used by Response::builder())
impl<T> IntoResponseError<T> for http::Result<T> {
    fn into_response_error(self) -> Result<T, AppError> {
        self.map_err(AppError::server)
    }
}
