mod decode;
mod errors;
mod types;

pub use decode::{decode_form, parse_urlencoded};
pub use errors::FormError;
pub use types::{FieldSetter, FieldTable, FormShape};
