use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::BTreeMap;
use tokio::sync::Mutex;

use super::errors::SnippetError;
use super::types::{Snippet, SnippetStore};

/// Days a new snippet stays visible
const SNIPPET_EXPIRY_DAYS: i64 = 7;

/// How many snippets the home page lists
const LATEST_LIMIT: usize = 10;

#[derive(Default)]
pub struct MemorySnippetStore {
    snippets: Mutex<BTreeMap<i64, Snippet>>,
}

impl MemorySnippetStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    async fn insert_raw(&self, snippet: Snippet) {
        self.snippets.lock().await.insert(snippet.id, snippet);
    }
}

#[async_trait]
impl SnippetStore for MemorySnippetStore {
    async fn insert(&self, title: &str, content: &str) -> Result<i64, SnippetError> {
        let mut snippets = self.snippets.lock().await;
        let id = snippets.keys().next_back().map_or(1, |last| last + 1);
        let created = Utc::now();

        snippets.insert(
            id,
            Snippet {
                id,
                title: title.to_string(),
                content: content.to_string(),
                created,
                expires: created + Duration::days(SNIPPET_EXPIRY_DAYS),
            },
        );
        Ok(id)
    }

    async fn get(&self, id: i64) -> Result<Snippet, SnippetError> {
        self.snippets
            .lock()
            .await
            .get(&id)
            .filter(|s| s.expires > Utc::now())
            .cloned()
            .ok_or(SnippetError::NoRecord)
    }

    async fn latest(&self) -> Result<Vec<Snippet>, SnippetError> {
        let now = Utc::now();
        Ok(self
            .snippets
            .lock()
            .await
            .values()
            .rev()
            .filter(|s| s.expires > now)
            .take(LATEST_LIMIT)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = MemorySnippetStore::new();
        let id = store.insert("An old silent pond", "A frog jumps in").await.unwrap();

        let snippet = store.get(id).await.unwrap();
        assert_eq!(snippet.title, "An old silent pond");
        assert_eq!(snippet.expires - snippet.created, Duration::days(7));
    }

    #[tokio::test]
    async fn test_get_missing() {
        let store = MemorySnippetStore::new();
        assert_eq!(store.get(99).await, Err(SnippetError::NoRecord));
    }

    #[tokio::test]
    async fn test_expired_snippet_is_hidden() {
        let store = MemorySnippetStore::new();
        let now = Utc::now();
        store
            .insert_raw(Snippet {
                id: 1,
                title: "gone".to_string(),
                content: "gone".to_string(),
                created: now - Duration::days(8),
                expires: now - Duration::days(1),
            })
            .await;

        assert_eq!(store.get(1).await, Err(SnippetError::NoRecord));
        assert!(store.latest().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_latest_is_newest_first_and_capped() {
        let store = MemorySnippetStore::new();
        for i in 0..12 {
            store.insert(&format!("title {i}"), "content").await.unwrap();
        }

        let latest = store.latest().await.unwrap();
        assert_eq!(latest.len(), 10);
        assert_eq!(latest[0].title, "title 11");
        assert_eq!(latest[9].title, "title 2");
    }
}
