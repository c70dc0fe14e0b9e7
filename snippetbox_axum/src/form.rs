use axum::{
    body::{Body, Bytes},
    extract::{FromRef, FromRequest, Multipart, Request},
};
use http::header::CONTENT_TYPE;

use snippetbox::{FormError, FormShape, decode_form, parse_urlencoded};

use crate::error::AppError;
use crate::state::AppState;

const URLENCODED: &str = "application/x-www-form-urlencoded";
const MULTIPART: &str = "multipart/form-data";

fn mime_of(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Whether the body is a form submission the pipeline knows how to read.
pub(crate) fn is_form_content_type(content_type: &str) -> bool {
    matches!(mime_of(content_type).as_str(), URLENCODED | MULTIPART)
}

/// Flatten a buffered form body into ordered name/value pairs.
///
/// File parts of a multipart body are skipped.
pub(crate) async fn form_pairs(
    content_type: &str,
    body: Bytes,
) -> Result<Vec<(String, String)>, FormError> {
    match mime_of(content_type).as_str() {
        URLENCODED => parse_urlencoded(&body),
        MULTIPART => multipart_pairs(content_type, body).await,
        other => Err(FormError::Malformed(format!(
            "unsupported content type '{other}'"
        ))),
    }
}

async fn multipart_pairs(
    content_type: &str,
    body: Bytes,
) -> Result<Vec<(String, String)>, FormError> {
    let req = Request::builder()
        .header(CONTENT_TYPE, content_type)
        .body(Body::from(body))
        .map_err(|e| FormError::Malformed(e.to_string()))?;

    let mut multipart = Multipart::from_request(req, &())
        .await
        .map_err(|e| FormError::Malformed(e.body_text()))?;

    let mut pairs = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| FormError::Malformed(e.body_text()))?
    {
        if field.file_name().is_some() {
            continue;
        }
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        let value = field
            .text()
            .await
            .map_err(|e| FormError::Malformed(e.body_text()))?;
        pairs.push((name, value));
    }

    Ok(pairs)
}

/// Extractor that decodes a posted form into `T` through its field table.
///
/// A body that cannot be read or parsed is a 400. A field table that is
/// itself broken is a 500.
#[derive(Debug)]
pub struct PostForm<T>(pub T);

impl<T, S> FromRequest<S> for PostForm<T>
where
    T: FormShape + Send,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let limit = AppState::from_ref(state).config.form_body_limit;

        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| FormError::Malformed("missing content type".to_string()))?;

        let body = axum::body::to_bytes(req.into_body(), limit)
            .await
            .map_err(|e| FormError::Malformed(e.to_string()))?;

        let pairs = form_pairs(&content_type, body).await?;
        Ok(PostForm(decode_form(pairs)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_state;
    use axum::{Router, response::IntoResponse, routing::post};
    use http::StatusCode;
    use snippetbox::FieldTable;
    use tower::ServiceExt;

    #[derive(Debug, Default)]
    struct NoteForm {
        title: String,
        content: String,
    }

    impl FormShape for NoteForm {
        fn field_table() -> FieldTable<Self> {
            FieldTable::<Self>::new()
                .field("title", |f| &mut f.title)
                .field("content", |f| &mut f.content)
        }
    }

    async fn echo(PostForm(form): PostForm<NoteForm>) -> impl IntoResponse {
        format!("{}|{}", form.title, form.content)
    }

    fn app() -> Router {
        Router::new()
            .route("/", post(echo))
            .with_state(test_state())
    }

    async fn send(content_type: &str, body: &'static str) -> (StatusCode, String) {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/")
                    .header(CONTENT_TYPE, content_type)
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[test]
    fn test_is_form_content_type() {
        assert!(is_form_content_type("application/x-www-form-urlencoded"));
        assert!(is_form_content_type("Multipart/Form-Data; boundary=x"));
        assert!(!is_form_content_type("application/json"));
    }

    #[tokio::test]
    async fn test_urlencoded_form() {
        let (status, body) = send(
            "application/x-www-form-urlencoded",
            "title=Hello+there&content=a%26b&extra=ignored",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "Hello there|a&b");
    }

    #[tokio::test]
    async fn test_multipart_form() {
        let body = "--XYZ\r\n\
            Content-Disposition: form-data; name=\"title\"\r\n\r\n\
            Hi\r\n\
            --XYZ\r\n\
            Content-Disposition: form-data; name=\"upload\"; filename=\"a.txt\"\r\n\r\n\
            file body\r\n\
            --XYZ\r\n\
            Content-Disposition: form-data; name=\"content\"\r\n\r\n\
            There\r\n\
            --XYZ--\r\n";
        let (status, echoed) = send("multipart/form-data; boundary=XYZ", body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(echoed, "Hi|There");
    }

    #[tokio::test]
    async fn test_bad_percent_escape_is_bad_request() {
        let (status, _) = send("application/x-www-form-urlencoded", "title=%zz").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unsupported_content_type_is_bad_request() {
        let (status, _) = send("application/json", "{\"title\":\"x\"}").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
