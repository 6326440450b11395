//! The transition request ("action") describing what happened.

use super::action_types;
use super::shape::kind_of;
use crate::store::StoreError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A plain description of a state change.
///
/// Every action carries a `type` discriminant. Any other data travels as
/// named fields next to it, so an action serializes to a flat JSON object
/// such as `{"type": "ADD_TODO", "text": "write docs"}`.
///
/// Actions are treated as immutable once dispatched; the store hands the
/// same value back to the caller when the dispatch completes.
///
/// # Example
///
/// ```rust
/// use cairn::core::Action;
/// use serde_json::json;
///
/// let action = Action::new("ADD_TODO").with("text", "write docs");
///
/// assert_eq!(action.action_type(), "ADD_TODO");
/// assert_eq!(action.get("text"), Some(&json!("write docs")));
/// assert_eq!(
///     serde_json::to_value(&action).unwrap(),
///     json!({ "type": "ADD_TODO", "text": "write docs" })
/// );
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type")]
    action_type: String,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

impl Action {
    /// Create an action with the given type and no fields.
    pub fn new(action_type: impl Into<String>) -> Self {
        Self {
            action_type: action_type.into(),
            fields: Map::new(),
        }
    }

    /// Attach a field, returning the extended action.
    ///
    /// A field named `type` is ignored; the discriminant is fixed at
    /// construction.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        if key != "type" {
            self.fields.insert(key, value.into());
        }
        self
    }

    /// Validate an untyped value and turn it into an action.
    ///
    /// The value must be a plain record with a `type` that is present and
    /// not `null`. String types are taken as-is; other scalar types are
    /// stringified.
    ///
    /// # Errors
    ///
    /// - [`StoreError::NotPlainRecord`] if the value is not a JSON object
    /// - [`StoreError::MissingActionType`] if `type` is absent or `null`
    ///
    /// # Example
    ///
    /// ```rust
    /// use cairn::core::Action;
    /// use cairn::store::StoreError;
    /// use serde_json::json;
    ///
    /// let action = Action::from_json(json!({ "type": "INC", "by": 2 })).unwrap();
    /// assert_eq!(action.action_type(), "INC");
    ///
    /// assert!(matches!(
    ///     Action::from_json(json!({ "by": 2 })),
    ///     Err(StoreError::MissingActionType)
    /// ));
    /// ```
    pub fn from_json(value: Value) -> Result<Self, StoreError> {
        let mut fields = match value {
            Value::Object(fields) => fields,
            other => {
                return Err(StoreError::NotPlainRecord {
                    kind: kind_of(&other),
                })
            }
        };

        let action_type = match fields.remove("type") {
            None | Some(Value::Null) => return Err(StoreError::MissingActionType),
            Some(Value::String(action_type)) => action_type,
            Some(other) => other.to_string(),
        };

        Ok(Self {
            action_type,
            fields,
        })
    }

    /// The discriminant of this action.
    pub fn action_type(&self) -> &str {
        &self.action_type
    }

    /// Check whether this action has the given type.
    pub fn is(&self, action_type: &str) -> bool {
        self.action_type == action_type
    }

    /// Look up a field by name.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// All fields other than the type.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub(crate) fn init() -> Self {
        Self::new(action_types::init())
    }

    pub(crate) fn replace() -> Self {
        Self::new(action_types::replace())
    }

    pub(crate) fn probe_unknown() -> Self {
        Self::new(action_types::probe_unknown_action())
    }

    pub(crate) fn is_init(&self) -> bool {
        self.is(action_types::init())
    }

    pub(crate) fn is_replace(&self) -> bool {
        self.is(action_types::replace())
    }
}

impl TryFrom<Value> for Action {
    type Error = StoreError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_json(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builder_collects_fields() {
        let action = Action::new("MOVE").with("x", 3).with("y", -1);

        assert!(action.is("MOVE"));
        assert_eq!(action.get("x"), Some(&json!(3)));
        assert_eq!(action.get("y"), Some(&json!(-1)));
        assert_eq!(action.fields().len(), 2);
    }

    #[test]
    fn type_field_cannot_be_overwritten() {
        let action = Action::new("MOVE").with("type", "OTHER");

        assert_eq!(action.action_type(), "MOVE");
        assert!(action.get("type").is_none());
    }

    #[test]
    fn serializes_as_flat_record() {
        let action = Action::new("ADD").with("amount", 5);
        let json = serde_json::to_value(&action).unwrap();

        assert_eq!(json, json!({ "type": "ADD", "amount": 5 }));

        let back: Action = serde_json::from_value(json).unwrap();
        assert_eq!(back, action);
    }

    #[test]
    fn from_json_rejects_non_records() {
        let result = Action::from_json(json!(["ADD"]));
        assert!(matches!(
            result,
            Err(StoreError::NotPlainRecord { kind: "array" })
        ));
    }

    #[test]
    fn from_json_rejects_missing_or_null_type() {
        assert!(matches!(
            Action::from_json(json!({ "amount": 1 })),
            Err(StoreError::MissingActionType)
        ));
        assert!(matches!(
            Action::from_json(json!({ "type": null })),
            Err(StoreError::MissingActionType)
        ));
    }

    #[test]
    fn from_json_stringifies_scalar_types() {
        let action = Action::from_json(json!({ "type": 42 })).unwrap();
        assert_eq!(action.action_type(), "42");

        let action = Action::from_json(json!({ "type": false })).unwrap();
        assert_eq!(action.action_type(), "false");
    }

    #[test]
    fn reserved_actions_are_recognised() {
        assert!(Action::init().is_init());
        assert!(Action::replace().is_replace());
        assert!(!Action::probe_unknown().is_init());
        assert!(!Action::new("INC").is_replace());
    }
}
