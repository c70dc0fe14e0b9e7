use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::errors::SnippetError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snippet {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub created: DateTime<Utc>,
    pub expires: DateTime<Utc>,
}

/// Data collaborator behind the snippet pages.
#[async_trait]
pub trait SnippetStore: Send + Sync + 'static {
    async fn insert(&self, title: &str, content: &str) -> Result<i64, SnippetError>;

    /// Unexpired snippet `id`, or [`SnippetError::NoRecord`].
    async fn get(&self, id: i64) -> Result<Snippet, SnippetError>;

    /// Most recently created unexpired snippets, newest first.
    async fn latest(&self) -> Result<Vec<Snippet>, SnippetError>;
}
