use std::collections::HashSet;

use super::errors::FormError;
use super::types::{FieldTable, FormShape};

/// Fill a `T` from submitted name/value pairs.
///
/// The first value for a name wins and names the shape does not declare are
/// ignored. A shape whose table is empty or declares a name twice is rejected
/// as [`FormError::Programmer`].
pub fn decode_form<T, I, K, V>(pairs: I) -> Result<T, FormError>
where
    T: FormShape,
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<String>,
{
    let table = T::field_table();
    check_table(&table)?;

    let mut target = T::default();
    let mut seen: HashSet<&'static str> = HashSet::new();

    for (name, value) in pairs {
        let Some((field, setter)) = table
            .fields
            .iter()
            .find(|(field, _)| *field == name.as_ref())
        else {
            continue;
        };

        if seen.insert(*field) {
            *setter(&mut target) = value.into();
        }
    }

    Ok(target)
}

fn check_table<T>(table: &FieldTable<T>) -> Result<(), FormError> {
    if table.fields.is_empty() {
        return Err(FormError::Programmer(format!(
            "{} declares no fields",
            std::any::type_name::<T>()
        )));
    }

    let mut names = HashSet::new();
    for name in table.names() {
        if name.is_empty() {
            return Err(FormError::Programmer(format!(
                "{} declares an empty field name",
                std::any::type_name::<T>()
            )));
        }
        if !names.insert(name) {
            return Err(FormError::Programmer(format!(
                "{} declares field '{name}' twice",
                std::any::type_name::<T>()
            )));
        }
    }

    Ok(())
}

/// Decode an `application/x-www-form-urlencoded` body.
///
/// Percent escapes must be well formed; anything else is a client error.
pub fn parse_urlencoded(body: &[u8]) -> Result<Vec<(String, String)>, FormError> {
    let mut bytes = body.iter().enumerate();
    while let Some((i, b)) = bytes.next() {
        if *b != b'%' {
            continue;
        }
        let escape = body.get(i + 1..i + 3).unwrap_or_default();
        if escape.len() != 2 || !escape.iter().all(u8::is_ascii_hexdigit) {
            return Err(FormError::Malformed(format!("invalid escape at byte {i}")));
        }
        bytes.nth(1);
    }

    Ok(url::form_urlencoded::parse(body)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect())
}
