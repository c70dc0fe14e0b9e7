use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use http::header::{CACHE_CONTROL, HeaderValue};
use http::request::Parts;

use snippetbox::{Identity, Session, resolve_identity};

use crate::error::AppError;
use crate::state::AppState;

/// Per-request authentication fact, recomputed on every request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AuthContext {
    pub identity: Option<Identity>,
}

impl AuthContext {
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }
}

impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .copied()
            .ok_or_else(|| AppError::server("authentication stage is not installed"))
    }
}

/// Resolve the session's user and attach an [`AuthContext`] to the request.
///
/// A failing user lookup aborts the request with a 500 rather than letting it
/// through as anonymous.
pub async fn authenticate(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let Some(session) = req.extensions().get::<Session>().cloned() else {
        return AppError::server("session stage is not installed").into_response();
    };

    let identity = match resolve_identity(&session, state.users.as_ref()).await {
        Ok(identity) => identity,
        Err(e) => return AppError::from(e).into_response(),
    };

    req.extensions_mut().insert(AuthContext { identity });
    next.run(req).await
}

/// Authorization gate: anonymous requests are redirected to the login page and
/// never reach the handler.
pub async fn require_authentication(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let authenticated = req
        .extensions()
        .get::<AuthContext>()
        .is_some_and(AuthContext::is_authenticated);

    if !authenticated {
        tracing::debug!(uri = %req.uri(), "Redirecting anonymous request to login");
        return Redirect::to(&state.config.login_url).into_response();
    }

    let mut response = next.run(req).await;
    response
        .headers_mut()
        .insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{FailingUserStore, test_state, test_state_with_users};
    use axum::{Router, body::Body, middleware::from_fn_with_state, routing::get};
    use http::{StatusCode, header::LOCATION};
    use snippetbox::{AUTHENTICATED_USER_ID, UserStore};
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn whoami(auth: AuthContext) -> String {
        match auth.identity {
            Some(identity) => format!("user {}", identity.user_id),
            None => "anonymous".to_string(),
        }
    }

    // Simulates a session that already carries a user id
    async fn with_user(mut req: Request, next: Next) -> Response {
        let user_id = req
            .headers()
            .get("x-test-user")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<i64>().ok());
        if let (Some(session), Some(id)) = (req.extensions_mut().get::<Session>(), user_id) {
            session.put(AUTHENTICATED_USER_ID, id).await.unwrap();
        }
        next.run(req).await
    }

    fn app(state: AppState) -> Router {
        Router::new()
            .route("/whoami", get(whoami))
            .route(
                "/private",
                get(|| async { "secret" })
                    .route_layer(from_fn_with_state(state.clone(), require_authentication)),
            )
            .layer(from_fn_with_state(state.clone(), authenticate))
            .layer(axum::middleware::from_fn(with_user))
            .layer(from_fn_with_state(state.clone(), crate::session::load_session))
            .with_state(state)
    }

    fn get_as(uri: &str, user: Option<i64>) -> Request {
        let mut builder = Request::builder().uri(uri);
        if let Some(id) = user {
            builder = builder.header("x-test-user", id.to_string());
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_anonymous_request() {
        let response = app(test_state())
            .oneshot(get_as("/whoami", None))
            .await
            .unwrap();
        assert_eq!(body_string(response).await, "anonymous");
    }

    #[tokio::test]
    async fn test_existing_user_is_authenticated() {
        let (state, users) = test_state_with_users();
        let id = users
            .insert("Alice", "alice@example.com", "pa55word")
            .await
            .unwrap();

        let response = app(state).oneshot(get_as("/whoami", Some(id))).await.unwrap();
        assert_eq!(body_string(response).await, format!("user {id}"));
    }

    #[tokio::test]
    async fn test_unknown_user_is_anonymous() {
        let response = app(test_state())
            .oneshot(get_as("/whoami", Some(999)))
            .await
            .unwrap();
        assert_eq!(body_string(response).await, "anonymous");
    }

    #[tokio::test]
    async fn test_user_lookup_failure_is_server_error() {
        let mut state = test_state();
        state.users = Arc::new(FailingUserStore);

        let response = app(state).oneshot(get_as("/whoami", Some(1))).await.unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_gate_redirects_anonymous() {
        let response = app(test_state())
            .oneshot(get_as("/private", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get(LOCATION).unwrap(), "/user/login");
    }

    #[tokio::test]
    async fn test_gate_admits_authenticated_and_disables_caching() {
        let (state, users) = test_state_with_users();
        let id = users
            .insert("Bob", "bob@example.com", "pa55word")
            .await
            .unwrap();

        let response = app(state).oneshot(get_as("/private", Some(id))).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get(CACHE_CONTROL).unwrap(), "no-store");
        assert_eq!(body_string(response).await, "secret");
    }
}
