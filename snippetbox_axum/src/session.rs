use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use http::header::{CACHE_CONTROL, HeaderValue, SET_COOKIE, VARY};

use crate::error::AppError;
use crate::state::AppState;

/// Load the caller's session for the rest of the chain and write it back
/// before the response leaves.
///
/// Handlers reach the session through `Extension<snippetbox::Session>`.
pub async fn load_session(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let session = match state.sessions.load(req.headers()).await {
        Ok(session) => session,
        Err(e) => return AppError::from(e).into_response(),
    };

    req.extensions_mut().insert(session.clone());
    let mut response = next.run(req).await;

    match state.sessions.commit(&session).await {
        Ok(Some(cookie)) => {
            let headers = response.headers_mut();
            headers.append(SET_COOKIE, cookie);
            headers.append(CACHE_CONTROL, HeaderValue::from_static("no-cache=\"Set-Cookie\""));
        }
        Ok(None) => {}
        Err(e) => return AppError::from(e).into_response(),
    }

    response
        .headers_mut()
        .append(VARY, HeaderValue::from_static("Cookie"));
    response
}
