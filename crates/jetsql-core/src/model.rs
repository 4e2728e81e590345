//! Records that INSERT can take values from.
//!
//! `#[derive(Table)]` implements [`Model`] for the annotated struct. JSON
//! objects and string-keyed maps work out of the box.

use std::collections::{BTreeMap, HashMap};

use serde_json::Value;

use crate::error::{BuildError, Result};
use crate::value::SqlValue;

/// A record whose fields map to column names.
pub trait Model {
    /// The value stored for `column`, or `None` if the record has no such
    /// field.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::ShapeMismatch`] when the value is not a record at
    /// all.
    fn field_value(&self, column: &str) -> Result<Option<SqlValue>>;
}

impl<M: Model + ?Sized> Model for &M {
    fn field_value(&self, column: &str) -> Result<Option<SqlValue>> {
        (**self).field_value(column)
    }
}

impl Model for BTreeMap<String, SqlValue> {
    fn field_value(&self, column: &str) -> Result<Option<SqlValue>> {
        Ok(self.get(column).cloned())
    }
}

impl Model for HashMap<String, SqlValue> {
    fn field_value(&self, column: &str) -> Result<Option<SqlValue>> {
        Ok(self.get(column).cloned())
    }
}

impl Model for Value {
    fn field_value(&self, column: &str) -> Result<Option<SqlValue>> {
        let Value::Object(fields) = self else {
            return Err(BuildError::shape(format!(
                "expected a JSON object as model, got {}",
                json_type(self)
            )));
        };
        Ok(fields.get(column).map(json_to_sql))
    }
}

const fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Nested arrays and objects are stored as JSON text.
fn json_to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Bool(*b),
        Value::Number(n) => n
            .as_i64()
            .map(SqlValue::Int)
            .or_else(|| n.as_f64().map(SqlValue::Float))
            .unwrap_or(SqlValue::Null),
        Value::String(s) => SqlValue::Text(s.clone()),
        Value::Array(_) | Value::Object(_) => SqlValue::Text(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FaultKind;
    use serde_json::json;

    #[test]
    fn test_json_object_fields() {
        let record = json!({"id": 7, "score": 1.5, "name": "ann", "tags": ["a"], "gone": null});
        assert_eq!(record.field_value("id").unwrap(), Some(SqlValue::Int(7)));
        assert_eq!(record.field_value("score").unwrap(), Some(SqlValue::Float(1.5)));
        assert_eq!(
            record.field_value("tags").unwrap(),
            Some(SqlValue::Text(String::from("[\"a\"]")))
        );
        assert_eq!(record.field_value("gone").unwrap(), Some(SqlValue::Null));
        assert_eq!(record.field_value("missing").unwrap(), None);
    }

    #[test]
    fn test_non_object_is_shape_mismatch() {
        let err = json!([1, 2]).field_value("id").unwrap_err();
        assert_eq!(err.kind(), FaultKind::ShapeMismatch);
    }

    #[test]
    fn test_map_model() {
        let mut record = BTreeMap::new();
        record.insert(String::from("id"), SqlValue::Int(1));
        assert_eq!(record.field_value("id").unwrap(), Some(SqlValue::Int(1)));
        assert_eq!(record.field_value("name").unwrap(), None);
    }
}
