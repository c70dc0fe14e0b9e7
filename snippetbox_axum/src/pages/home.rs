use askama::Template;
use axum::{extract::State, response::Response};
use http::StatusCode;

use crate::error::AppError;
use crate::state::AppState;

use super::{PageContext, TemplateData, human_date, render};

struct SnippetRow {
    id: i64,
    title: String,
    created: String,
}

#[derive(Template)]
#[template(path = "home.j2", escape = "html")]
struct HomeTemplate {
    data: TemplateData,
    snippets: Vec<SnippetRow>,
}

pub(crate) async fn home(
    State(state): State<AppState>,
    page: PageContext,
) -> Result<Response, AppError> {
    let snippets = state
        .snippets
        .latest()
        .await?
        .into_iter()
        .map(|s| SnippetRow {
            id: s.id,
            created: human_date(&s.created),
            title: s.title,
        })
        .collect();

    let template = HomeTemplate {
        data: page.template_data().await,
        snippets,
    };
    render(StatusCode::OK, &template)
}

/// Liveness check that bypasses templates entirely.
pub(crate) async fn ping() -> &'static str {
    "OK"
}
