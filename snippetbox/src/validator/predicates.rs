use regex::Regex;
use std::sync::LazyLock;

const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$";

static EMAIL_RX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(EMAIL_PATTERN).expect("email pattern is a valid regex"));

/// True if `value` contains anything other than whitespace.
pub fn not_blank(value: &str) -> bool {
    !value.trim().is_empty()
}

/// Length limits count Unicode scalar values, not bytes.
pub fn max_chars(value: &str, n: usize) -> bool {
    value.chars().count() <= n
}

pub fn min_chars(value: &str, n: usize) -> bool {
    value.chars().count() >= n
}

pub fn permitted_value<T: PartialEq>(value: &T, permitted: &[T]) -> bool {
    permitted.contains(value)
}

pub fn matches(value: &str, rx: &Regex) -> bool {
    rx.is_match(value)
}

pub fn is_valid_email(value: &str) -> bool {
    matches(value, &EMAIL_RX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_not_blank() {
        assert!(not_blank("x"));
        assert!(not_blank("  x "));
        assert!(!not_blank(""));
        assert!(!not_blank(" \t\n"));
    }

    #[test]
    fn test_char_limits_count_scalar_values() {
        // Three characters, four bytes
        let s = "zoë";
        assert_eq!(s.len(), 4);
        assert!(max_chars(s, 3));
        assert!(!max_chars(s, 2));
        assert!(min_chars(s, 3));
        assert!(!min_chars(s, 4));
    }

    #[test]
    fn test_permitted_value() {
        assert!(permitted_value(&1, &[1, 7, 365]));
        assert!(!permitted_value(&2, &[1, 7, 365]));
        assert!(permitted_value(&"b", &["a", "b"]));
        assert!(!permitted_value::<i32>(&1, &[]));
    }

    #[test]
    fn test_email_pattern_compiles() {
        assert!(Regex::new(EMAIL_PATTERN).is_ok());
    }

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("alice@example.com"));
        assert!(is_valid_email("a.b+tag@sub.example.co.uk"));
        assert!(!is_valid_email("alice"));
        assert!(!is_valid_email("alice@"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("alice@-example.com"));
        assert!(!is_valid_email("alice @example.com"));
    }

    proptest! {
        #[test]
        fn prop_max_chars_matches_scalar_count(s in "\\PC{0,40}", n in 0usize..50) {
            prop_assert_eq!(max_chars(&s, n), s.chars().count() <= n);
        }

        #[test]
        fn prop_min_chars_matches_scalar_count(s in "\\PC{0,40}", n in 0usize..50) {
            prop_assert_eq!(min_chars(&s, n), s.chars().count() >= n);
        }

        #[test]
        fn prop_max_and_min_agree_at_length(s in "\\PC{0,40}") {
            let n = s.chars().count();
            prop_assert!(max_chars(&s, n));
            prop_assert!(min_chars(&s, n));
            if n > 0 {
                prop_assert!(!max_chars(&s, n - 1));
            }
        }
    }
}
