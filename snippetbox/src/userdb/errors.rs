use thiserror::Error;

#[derive(Clone, Error, Debug, PartialEq)]
pub enum UserError {
    /// Email or password did not match; deliberately silent about which
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Email address is already registered")]
    DuplicateEmail,

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Crypto error: {0}")]
    Crypto(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_credentials_message_is_generic() {
        let msg = UserError::InvalidCredentials.to_string();
        assert!(!msg.to_lowercase().contains("email"));
        assert!(!msg.to_lowercase().contains("password"));
    }

    #[test]
    fn test_error_propagation() {
        fn register(taken: bool) -> Result<i64, UserError> {
            if taken {
                return Err(UserError::DuplicateEmail);
            }
            Ok(1)
        }

        fn signup(taken: bool) -> Result<String, UserError> {
            let id = register(taken)?;
            Ok(format!("user {id}"))
        }

        assert_eq!(signup(false).unwrap(), "user 1");
        assert_eq!(signup(true), Err(UserError::DuplicateEmail));
    }
}
