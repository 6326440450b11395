//! Plain-record shape checks for values arriving from outside the type system.
//!
//! Inside the crate actions are typed and always carry a discriminant, so
//! these predicates are only consulted where data is deserialized, e.g.
//! [`Action::from_json`](crate::core::Action::from_json).

use serde_json::Value;

/// Check whether a value is a plain data record (a JSON object).
///
/// Arrays, strings, numbers, booleans and `null` are not records.
///
/// # Example
///
/// ```rust
/// use cairn::core::is_plain_record;
/// use serde_json::json;
///
/// assert!(is_plain_record(&json!({ "type": "INC" })));
/// assert!(!is_plain_record(&json!(["INC"])));
/// assert!(!is_plain_record(&json!(null)));
/// ```
pub fn is_plain_record(value: &Value) -> bool {
    matches!(value, Value::Object(_))
}

/// Name the kind of a value for diagnostics.
pub fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn objects_are_plain_records() {
        assert!(is_plain_record(&json!({})));
        assert!(is_plain_record(&json!({ "type": "ADD", "nested": { "a": 1 } })));
    }

    #[test]
    fn non_objects_are_rejected() {
        for value in [json!(null), json!(true), json!(1), json!("ADD"), json!([])] {
            assert!(!is_plain_record(&value), "{value} should not be a record");
        }
    }

    #[test]
    fn kind_names_every_variant() {
        assert_eq!(kind_of(&json!(null)), "null");
        assert_eq!(kind_of(&json!(false)), "boolean");
        assert_eq!(kind_of(&json!(2.5)), "number");
        assert_eq!(kind_of(&json!("x")), "string");
        assert_eq!(kind_of(&json!([1])), "array");
        assert_eq!(kind_of(&json!({})), "object");
    }
}
