use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::errors::UserError;

/// A registered account.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub(crate) salt: Vec<u8>,
    pub(crate) hashed_password: Vec<u8>,
    pub created_at: DateTime<Utc>,
}

/// Identity collaborator consulted by the login, signup and authentication stages.
#[async_trait]
pub trait UserStore: Send + Sync + 'static {
    /// Register a new account, returning its id.
    async fn insert(&self, name: &str, email: &str, password: &str) -> Result<i64, UserError>;

    /// Id of the account matching `email` and `password`.
    async fn authenticate(&self, email: &str, password: &str) -> Result<i64, UserError>;

    async fn exists(&self, id: i64) -> Result<bool, UserError>;
}
