use askama::Template;
use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use http::StatusCode;

use snippetbox::{
    FieldTable, FormShape, UserError, Validator, is_valid_email, log_in, log_out, min_chars,
    not_blank,
};

use crate::error::AppError;
use crate::form::PostForm;
use crate::state::AppState;

use super::{PageContext, TemplateData, render};

const BLANK: &str = "This field cannot be blank";
const BAD_EMAIL: &str = "This field must be a valid email address";

/// Where a fresh login lands.
const AFTER_LOGIN: &str = "/snippet/create";

#[derive(Debug, Default)]
pub(crate) struct SignupForm {
    name: String,
    email: String,
    password: String,
    validator: Validator,
}

impl FormShape for SignupForm {
    fn field_table() -> FieldTable<Self> {
        FieldTable::<Self>::new()
            .field("name", |f| &mut f.name)
            .field("email", |f| &mut f.email)
            .field("password", |f| &mut f.password)
    }
}

impl SignupForm {
    fn validate(&mut self) {
        let v = &mut self.validator;
        v.check_field(not_blank(&self.name), "name", BLANK);
        v.check_field(not_blank(&self.email), "email", BLANK);
        v.check_field(is_valid_email(&self.email), "email", BAD_EMAIL);
        v.check_field(not_blank(&self.password), "password", BLANK);
        v.check_field(
            min_chars(&self.password, 8),
            "password",
            "Password must be at least 8 characters long",
        );
    }
}

#[derive(Debug, Default)]
pub(crate) struct LoginForm {
    email: String,
    password: String,
    validator: Validator,
}

impl FormShape for LoginForm {
    fn field_table() -> FieldTable<Self> {
        FieldTable::<Self>::new()
            .field("email", |f| &mut f.email)
            .field("password", |f| &mut f.password)
    }
}

impl LoginForm {
    fn validate(&mut self) {
        let v = &mut self.validator;
        v.check_field(not_blank(&self.email), "email", BLANK);
        v.check_field(is_valid_email(&self.email), "email", BAD_EMAIL);
        v.check_field(not_blank(&self.password), "password", BLANK);
    }
}

#[derive(Template)]
#[template(path = "signup.j2", escape = "html")]
struct SignupTemplate {
    data: TemplateData,
    form: SignupForm,
}

#[derive(Template)]
#[template(path = "login.j2", escape = "html")]
struct LoginTemplate {
    data: TemplateData,
    form: LoginForm,
}

pub(crate) async fn user_signup(page: PageContext) -> Result<Response, AppError> {
    let template = SignupTemplate {
        data: page.template_data().await,
        form: SignupForm::default(),
    };
    render(StatusCode::OK, &template)
}

pub(crate) async fn user_signup_post(
    State(state): State<AppState>,
    page: PageContext,
    PostForm(mut form): PostForm<SignupForm>,
) -> Result<Response, AppError> {
    form.validate();

    if form.validator.valid() {
        match state
            .users
            .insert(&form.name, &form.email, &form.password)
            .await
        {
            Ok(id) => {
                tracing::info!(user_id = id, "New account registered");
                page.flash("Your signup was successful. Please log in.")
                    .await?;
                return Ok(Redirect::to("/user/login").into_response());
            }
            Err(UserError::DuplicateEmail) => {
                form.validator
                    .add_field_error("email", "Email address is already in use");
            }
            Err(e) => return Err(e.into()),
        }
    }

    let template = SignupTemplate {
        data: page.template_data().await,
        form,
    };
    render(StatusCode::UNPROCESSABLE_ENTITY, &template)
}

pub(crate) async fn user_login(page: PageContext) -> Result<Response, AppError> {
    let template = LoginTemplate {
        data: page.template_data().await,
        form: LoginForm::default(),
    };
    render(StatusCode::OK, &template)
}

pub(crate) async fn user_login_post(
    State(state): State<AppState>,
    page: PageContext,
    PostForm(mut form): PostForm<LoginForm>,
) -> Result<Response, AppError> {
    form.validate();

    if form.validator.valid() {
        match state.users.authenticate(&form.email, &form.password).await {
            Ok(id) => {
                log_in(&page.session, id).await?;
                return Ok(Redirect::to(AFTER_LOGIN).into_response());
            }
            Err(UserError::InvalidCredentials) => {
                form.validator
                    .add_non_field_error("Email or password is incorrect");
            }
            Err(e) => return Err(e.into()),
        }
    }

    let template = LoginTemplate {
        data: page.template_data().await,
        form,
    };
    render(StatusCode::UNPROCESSABLE_ENTITY, &template)
}

pub(crate) async fn user_logout_post(page: PageContext) -> Result<Response, AppError> {
    log_out(&page.session).await?;
    page.flash("You've been logged out successfully!").await?;
    Ok(Redirect::to("/").into_response())
}
