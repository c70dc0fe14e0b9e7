use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use futures_util::FutureExt;
use http::header::{self, HeaderValue};
use std::backtrace::Backtrace;
use std::net::SocketAddr;
use std::panic::AssertUnwindSafe;

use crate::error::{AppError, ServerFault};
use crate::state::AppState;

const CONTENT_SECURITY_POLICY: &str =
    "default-src 'self'; style-src 'self' fonts.googleapis.com; font-src fonts.gstatic.com";

fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}

/// Outermost stage: turns panics and infrastructure faults into a generic 500.
///
/// Faults raised inside the chain arrive as a [`ServerFault`] response
/// extension and are logged here with the request's method and URI. A panic
/// additionally closes the connection.
pub async fn recover_panic(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();

    let mut response = match AssertUnwindSafe(next.run(req)).catch_unwind().await {
        Ok(response) => response,
        Err(panic) => {
            tracing::error!(
                %method,
                %uri,
                panic = panic_message(panic.as_ref()),
                backtrace = %Backtrace::force_capture(),
                "Request handler panicked"
            );
            let mut response = AppError::server("panic").into_response();
            response.extensions_mut().remove::<ServerFault>();
            response
                .headers_mut()
                .insert(header::CONNECTION, HeaderValue::from_static("close"));
            return response;
        }
    };

    if let Some(fault) = response.extensions_mut().remove::<ServerFault>() {
        tracing::error!(
            %method,
            %uri,
            error = %fault.detail,
            backtrace = %fault.backtrace,
            "Server error"
        );
    }

    response
}

/// One access log line per request.
pub async fn log_request(req: Request, next: Next) -> Response {
    let ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "-".to_string());

    tracing::info!(
        ip = %ip,
        proto = ?req.version(),
        method = %req.method(),
        uri = %req.uri(),
        "received request"
    );

    next.run(req).await
}

pub async fn common_headers(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    headers.insert(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static(CONTENT_SECURITY_POLICY),
    );
    headers.insert(
        header::REFERRER_POLICY,
        HeaderValue::from_static("origin-when-cross-origin"),
    );
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("deny"));
    headers.insert(header::X_XSS_PROTECTION, HeaderValue::from_static("0"));

    match HeaderValue::from_str(&state.config.server_header) {
        Ok(value) => {
            headers.insert(header::SERVER, value);
        }
        Err(_) => tracing::warn!("SERVER_HEADER is not a valid header value"),
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_state;
    use axum::{Router, body::Body, middleware::from_fn, middleware::from_fn_with_state, routing::get};
    use http::StatusCode;
    use tower::ServiceExt;

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_common_headers() {
        // Given a handler wrapped by the security header stage
        let state = test_state();
        let app = Router::new()
            .route("/", get(|| async { "OK" }))
            .layer(from_fn_with_state(state.clone(), common_headers))
            .with_state(state);

        // When it is called
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        // Then every security header is present and the handler still ran
        let headers = response.headers();
        assert_eq!(
            headers.get("Content-Security-Policy").unwrap(),
            "default-src 'self'; style-src 'self' fonts.googleapis.com; font-src fonts.gstatic.com"
        );
        assert_eq!(headers.get("Referrer-Policy").unwrap(), "origin-when-cross-origin");
        assert_eq!(headers.get("X-Content-Type-Options").unwrap(), "nosniff");
        assert_eq!(headers.get("X-Frame-Options").unwrap(), "deny");
        assert_eq!(headers.get("X-XSS-Protection").unwrap(), "0");
        assert_eq!(headers.get("Server").unwrap(), "snippetbox");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "OK");
    }

    async fn boom() -> &'static str {
        panic!("handler exploded")
    }

    #[tokio::test]
    async fn test_recover_panic_returns_500_and_closes_connection() {
        let app: Router = Router::new()
            .route("/boom", get(boom))
            .layer(from_fn(recover_panic));

        let response = app
            .oneshot(Request::builder().uri("/boom").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers().get(header::CONNECTION).unwrap(), "close");
        assert_eq!(body_string(response).await, "Internal Server Error");
    }

    #[tokio::test]
    async fn test_recover_strips_fault_detail() {
        let app: Router = Router::new()
            .route(
                "/fault",
                get(|| async { AppError::server("secret database password in message") }),
            )
            .layer(from_fn(recover_panic));

        let response = app
            .oneshot(Request::builder().uri("/fault").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.extensions().get::<ServerFault>().is_none());
        assert!(response.headers().get(header::CONNECTION).is_none());
        let body = body_string(response).await;
        assert!(!body.contains("password"));
    }

    #[tokio::test]
    async fn test_log_request_passes_through() {
        let app: Router = Router::new()
            .route("/", get(|| async { "logged" }))
            .layer(from_fn(log_request));

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(body_string(response).await, "logged");
    }
}
