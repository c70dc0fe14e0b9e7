//! Field and non-field error accumulation plus the predicates form rules are built from.

mod predicates;
mod types;

pub use predicates::{is_valid_email, matches, max_chars, min_chars, not_blank, permitted_value};
pub use types::Validator;
