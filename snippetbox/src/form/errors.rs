use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FormError {
    /// The client sent a body that cannot be decoded
    #[error("Malformed form submission: {0}")]
    Malformed(String),

    /// The target shape is defective; a deployment bug rather than bad input
    #[error("Invalid form shape: {0}")]
    Programmer(String),
}
