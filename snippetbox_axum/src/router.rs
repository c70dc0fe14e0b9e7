//! The full middleware chain in front of the snippetbox pages

use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
};

use crate::auth::{authenticate, require_authentication};
use crate::csrf::{csrf_guard, reject_forged_request};
use crate::error::AppError;
use crate::middleware::{common_headers, log_request, recover_panic};
use crate::pages;
use crate::session::load_session;
use crate::state::AppState;

/// Build the application router.
///
/// Every request runs, outermost first: panic recovery, access log, security
/// headers. Page routes additionally run session load/commit, the CSRF check
/// and authentication. Protected routes then pass the authorization gate, and
/// only after that is a failed CSRF check turned into a 400, so an anonymous
/// POST to a protected route is redirected to login rather than rejected.
pub fn app(state: AppState) -> Router {
    let dynamic = Router::new()
        .route("/", get(pages::home))
        .route("/snippet/view/{id}", get(pages::snippet_view))
        .route(
            "/user/signup",
            get(pages::user_signup).post(pages::user_signup_post),
        )
        .route(
            "/user/login",
            get(pages::user_login).post(pages::user_login_post),
        )
        .route_layer(from_fn(reject_forged_request));

    let protected = Router::new()
        .route(
            "/snippet/create",
            get(pages::snippet_create).post(pages::snippet_create_post),
        )
        .route("/user/logout", post(pages::user_logout_post))
        .route_layer(from_fn(reject_forged_request))
        .route_layer(from_fn_with_state(state.clone(), require_authentication));

    let pipeline = Router::new()
        .merge(dynamic)
        .merge(protected)
        .layer(from_fn_with_state(state.clone(), authenticate))
        .layer(from_fn_with_state(state.clone(), csrf_guard))
        .layer(from_fn_with_state(state.clone(), load_session));

    Router::new()
        .route("/ping", get(pages::ping))
        .merge(pipeline)
        .fallback(not_found)
        .layer(from_fn_with_state(state.clone(), common_headers))
        .layer(from_fn(log_request))
        .layer(from_fn(recover_panic))
        .with_state(state)
}

async fn not_found() -> AppError {
    AppError::NotFound
}
