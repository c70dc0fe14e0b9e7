use thiserror::Error;

#[derive(Clone, Error, Debug, PartialEq)]
pub enum SnippetError {
    #[error("No matching record found")]
    NoRecord,

    #[error("Storage error: {0}")]
    Storage(String),
}
