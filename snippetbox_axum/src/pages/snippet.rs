use askama::Template;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use http::StatusCode;

use snippetbox::{FieldTable, FormShape, Validator, max_chars, not_blank};

use crate::error::AppError;
use crate::form::PostForm;
use crate::state::AppState;

use super::{PageContext, TemplateData, human_date, render};

struct SnippetDetail {
    id: i64,
    title: String,
    content: String,
    created: String,
    expires: String,
}

#[derive(Template)]
#[template(path = "view.j2", escape = "html")]
struct ViewTemplate {
    data: TemplateData,
    snippet: SnippetDetail,
}

#[derive(Debug, Default)]
pub(crate) struct SnippetCreateForm {
    title: String,
    content: String,
    validator: Validator,
}

impl FormShape for SnippetCreateForm {
    fn field_table() -> FieldTable<Self> {
        FieldTable::<Self>::new()
            .field("title", |f| &mut f.title)
            .field("content", |f| &mut f.content)
    }
}

impl SnippetCreateForm {
    fn validate(&mut self) {
        let v = &mut self.validator;
        v.check_field(not_blank(&self.title), "title", "Title can't be blank");
        v.check_field(
            max_chars(&self.title, 100),
            "title",
            "Title can't be more than 100 chars long",
        );
        v.check_field(
            not_blank(&self.content),
            "content",
            "Content field can't be blank",
        );
    }
}

#[derive(Template)]
#[template(path = "create.j2", escape = "html")]
struct CreateTemplate {
    data: TemplateData,
    form: SnippetCreateForm,
}

pub(crate) async fn snippet_view(
    State(state): State<AppState>,
    Path(id): Path<String>,
    page: PageContext,
) -> Result<Response, AppError> {
    let id = match id.parse::<i64>() {
        Ok(id) if id >= 1 => id,
        _ => return Err(AppError::NotFound),
    };

    let snippet = state.snippets.get(id).await?;
    let template = ViewTemplate {
        data: page.template_data().await,
        snippet: SnippetDetail {
            id: snippet.id,
            created: human_date(&snippet.created),
            expires: human_date(&snippet.expires),
            title: snippet.title,
            content: snippet.content,
        },
    };
    render(StatusCode::OK, &template)
}

pub(crate) async fn snippet_create(page: PageContext) -> Result<Response, AppError> {
    let template = CreateTemplate {
        data: page.template_data().await,
        form: SnippetCreateForm::default(),
    };
    render(StatusCode::OK, &template)
}

pub(crate) async fn snippet_create_post(
    State(state): State<AppState>,
    page: PageContext,
    PostForm(mut form): PostForm<SnippetCreateForm>,
) -> Result<Response, AppError> {
    form.validate();
    if !form.validator.valid() {
        let template = CreateTemplate {
            data: page.template_data().await,
            form,
        };
        return render(StatusCode::UNPROCESSABLE_ENTITY, &template);
    }

    let id = state.snippets.insert(&form.title, &form.content).await?;
    page.flash("Snippet successfully created!").await?;

    Ok(Redirect::to(&format!("/snippet/view/{id}")).into_response())
}
