//! Server-rendered pages that sit behind the middleware chain

mod home;
mod snippet;
mod user;

pub(crate) use home::{home, ping};
pub(crate) use snippet::{snippet_create, snippet_create_post, snippet_view};
pub(crate) use user::{user_login, user_login_post, user_logout_post, user_signup, user_signup_post};

use askama::Template;
use axum::{
    extract::FromRequestParts,
    response::{Html, IntoResponse, Response},
};
use chrono::{DateTime, Datelike, Utc};
use http::{StatusCode, request::Parts};

use snippetbox::{CsrfToken, Session};

use crate::auth::AuthContext;
use crate::error::{AppError, IntoResponseError};

pub(crate) const FLASH_KEY: &str = "flash";

/// Values every page template can read.
#[derive(Debug, Clone)]
pub(crate) struct TemplateData {
    pub current_year: i32,
    pub flash: Option<String>,
    pub is_authenticated: bool,
    pub csrf_token: String,
}

/// Per-request pieces the pipeline left for the pages.
pub(crate) struct PageContext {
    pub session: Session,
    pub auth: AuthContext,
    csrf_token: Option<CsrfToken>,
}

impl PageContext {
    /// Build the template data, consuming any pending flash message.
    pub(crate) async fn template_data(&self) -> TemplateData {
        TemplateData {
            current_year: Utc::now().year(),
            flash: self.session.pop_string(FLASH_KEY).await,
            is_authenticated: self.auth.is_authenticated(),
            csrf_token: self
                .csrf_token
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
        }
    }

    pub(crate) async fn flash(&self, message: &str) -> Result<(), AppError> {
        Ok(self.session.put(FLASH_KEY, message).await?)
    }
}

impl<S> FromRequestParts<S> for PageContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::server("session stage is not installed"))?;

        Ok(Self {
            session,
            auth: parts
                .extensions
                .get::<AuthContext>()
                .copied()
                .unwrap_or_default(),
            csrf_token: parts.extensions.get::<CsrfToken>().cloned(),
        })
    }
}

pub(crate) fn render(status: StatusCode, template: &impl Template) -> Result<Response, AppError> {
    let html = template.render().into_response_error()?;
    Ok((status, Html(html)).into_response())
}

/// "02 Jan 2006 at 15:04" style timestamp in UTC.
pub(crate) fn human_date(t: &DateTime<Utc>) -> String {
    t.format("%d %b %Y at %H:%M").to_string()
}
