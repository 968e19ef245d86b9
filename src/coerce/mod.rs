//! @acp:module "Value Coercion"
//! @acp:summary "Best-effort conversion of free text into typed parameter values"
//! @acp:domain core
//! @acp:layer service
//!
//! Coercion never fails loudly: text that cannot be converted yields `None`
//! and the caller leaves the parameter untouched. A malformed cell must not
//! abort a batch.
//!
//! | Kind      | Accepted input                                              |
//! |-----------|-------------------------------------------------------------|
//! | Text      | anything, unchanged                                         |
//! | Integer   | yes/true/1, no/false/0 (any case), or a bare digit string   |
//! | Boolean   | as Integer, limited to 0 and 1                              |
//! | Number    | first signed decimal/integer literal after removing commas  |
//! | Reference | an integer element id                                       |

use std::sync::LazyLock;

use regex::Regex;

use crate::model::{ElementId, StorageKind, Value};

/// Decimal literal (`-12.5`, `.5`) or integer literal, optionally signed
static NUMBER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[-+]?\d*\.\d+|[-+]?\d+").unwrap()
});

/// @acp:summary "Coerce text into a value of the given kind, or nothing"
pub fn coerce(kind: StorageKind, text: &str) -> Option<Value> {
    match kind {
        StorageKind::Text => Some(Value::Text(text.to_string())),
        StorageKind::Integer => coerce_integer(text).map(Value::Integer),
        StorageKind::Boolean => match coerce_integer(text)? {
            0 => Some(Value::Boolean(false)),
            1 => Some(Value::Boolean(true)),
            _ => None,
        },
        StorageKind::Number => coerce_number(text).map(Value::Number),
        StorageKind::Reference => coerce_reference(text).map(Value::Reference),
    }
}

/// Yes/no words map to 1/0; enumeration labels are not reverse-mapped.
pub fn coerce_integer(text: &str) -> Option<i64> {
    let normalized = text.trim().to_lowercase();
    match normalized.as_str() {
        "yes" | "true" | "1" => Some(1),
        "no" | "false" | "0" => Some(0),
        s if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => s.parse().ok(),
        _ => None,
    }
}

/// Commas are treated as thousands separators and dropped before the scan.
pub fn coerce_number(text: &str) -> Option<f64> {
    let stripped = text.replace(',', "");
    NUMBER_PATTERN.find(&stripped)?.as_str().parse().ok()
}

pub fn coerce_reference(text: &str) -> Option<ElementId> {
    text.trim().parse::<i64>().ok().map(ElementId)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_passes_through() {
        assert_eq!(
            coerce(StorageKind::Text, "  padded "),
            Some(Value::Text("  padded ".into()))
        );
        assert_eq!(coerce(StorageKind::Text, ""), Some(Value::Text(String::new())));
    }

    #[test]
    fn test_boolean_words() {
        for yes in ["Yes", "TRUE", "1", " yes "] {
            assert_eq!(coerce(StorageKind::Boolean, yes), Some(Value::Boolean(true)));
            assert_eq!(coerce(StorageKind::Integer, yes), Some(Value::Integer(1)));
        }
        for no in ["No", "false", "0"] {
            assert_eq!(coerce(StorageKind::Boolean, no), Some(Value::Boolean(false)));
            assert_eq!(coerce(StorageKind::Integer, no), Some(Value::Integer(0)));
        }
        assert_eq!(coerce(StorageKind::Boolean, "Vertical"), None);
        assert_eq!(coerce(StorageKind::Integer, "Vertical"), None);
    }

    #[test]
    fn test_integer_digits_only() {
        assert_eq!(coerce_integer("42"), Some(42));
        assert_eq!(coerce_integer("007"), Some(7));
        assert_eq!(coerce_integer("-5"), None);
        assert_eq!(coerce_integer("4.5"), None);
        assert_eq!(coerce_integer(""), None);
        assert_eq!(coerce(StorageKind::Boolean, "2"), None);
    }

    #[test]
    fn test_number_extraction() {
        assert_eq!(coerce_number("area: -12.5 m2"), Some(-12.5));
        assert_eq!(coerce_number("3,000"), Some(3000.0));
        assert_eq!(coerce_number("3,000 items"), Some(3000.0));
        assert_eq!(coerce_number("3,000.50"), Some(3000.5));
        assert_eq!(coerce_number(".5"), Some(0.5));
        assert_eq!(coerce_number("width 200 mm"), Some(200.0));
        assert_eq!(coerce_number("n/a"), None);
    }

    #[test]
    fn test_reference_ids() {
        assert_eq!(
            coerce(StorageKind::Reference, " 311 "),
            Some(Value::Reference(ElementId(311)))
        );
        assert_eq!(coerce(StorageKind::Reference, "Concrete"), None);
    }
}
