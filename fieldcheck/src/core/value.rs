//! Value helpers shared by the engine and the built-in predicates.

use std::borrow::Cow;

use serde_json::{Number, Value};

/// True for `""`, `[]`, `{}`, `null`, `false` and numeric zero.
pub fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f == 0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// Convert numbers to their string form; everything else passes through.
///
/// Floats use the shortest form, so an integral float such as `5.0` reads
/// as `"5"`.
pub fn coerce_number(value: &Value) -> Cow<'_, Value> {
    match value {
        Value::Number(n) => Cow::Owned(Value::String(number_text(n))),
        other => Cow::Borrowed(other),
    }
}

fn number_text(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() => f.to_string(),
        _ => n.to_string(),
    }
}

/// The string content of a value, if it is a string.
pub fn text(value: &Value) -> Option<&str> {
    value.as_str()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn emptiness_covers_every_shape() {
        for empty in [json!(""), json!([]), json!({}), json!(null), json!(false), json!(0)] {
            assert!(is_empty(&empty), "{empty} should be empty");
        }
        for filled in [json!("a"), json!([0]), json!({"a": 1}), json!(true), json!(5)] {
            assert!(!is_empty(&filled), "{filled} should not be empty");
        }
    }

    #[test]
    fn coerce_number_stringifies_numbers_only() {
        assert_eq!(coerce_number(&json!(5)).into_owned(), json!("5"));
        assert_eq!(coerce_number(&json!(2.5)).into_owned(), json!("2.5"));
        assert_eq!(coerce_number(&json!("5")).into_owned(), json!("5"));
        assert_eq!(coerce_number(&json!(true)).into_owned(), json!(true));
    }

    #[test]
    fn integral_floats_lose_the_fraction() {
        assert_eq!(coerce_number(&json!(5.0)).into_owned(), json!("5"));
        assert_eq!(coerce_number(&json!(-3.0)).into_owned(), json!("-3"));
        assert_eq!(coerce_number(&json!(0.1)).into_owned(), json!("0.1"));
        assert_eq!(
            coerce_number(&json!(18446744073709551615u64)).into_owned(),
            json!("18446744073709551615")
        );
    }
}
