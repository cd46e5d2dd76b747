//! Conversion between JSON values and [`CellValue`].
//!
//! Objects with a string `name` member become [`CellValue::Named`]; any other
//! object becomes [`CellValue::Record`]. Arrays are kept as records keyed by
//! element index.

use std::collections::BTreeMap;

use cellfeed_core::CellValue;
use serde_json::{Map, Number, Value};

/// Decode a JSON value.
pub fn from_json(value: &Value) -> CellValue {
    match value {
        Value::Null => CellValue::Empty,
        Value::Bool(b) => CellValue::Boolean(*b),
        // u64/i64 beyond 2^53 lose precision, same as the source's own doubles
        Value::Number(n) => n.as_f64().map(CellValue::Number).unwrap_or_default(),
        Value::String(s) => CellValue::String(s.clone()),
        Value::Array(items) => CellValue::Record(
            items
                .iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), from_json(v)))
                .collect(),
        ),
        Value::Object(members) => {
            let mut fields: BTreeMap<String, CellValue> = members
                .iter()
                .filter(|(key, _)| key.as_str() != "name")
                .map(|(key, v)| (key.clone(), from_json(v)))
                .collect();
            match members.get("name") {
                Some(Value::String(name)) => CellValue::Named {
                    name: name.clone(),
                    fields,
                },
                Some(other) => {
                    fields.insert("name".to_string(), from_json(other));
                    CellValue::Record(fields)
                }
                None => CellValue::Record(fields),
            }
        }
    }
}

/// Encode a [`CellValue`] as JSON.
pub fn to_json(value: &CellValue) -> Value {
    match value {
        CellValue::Empty => Value::Null,
        CellValue::Boolean(b) => Value::Bool(*b),
        CellValue::Number(n) => Number::from_f64(*n).map(Value::Number).unwrap_or(Value::Null),
        CellValue::String(s) => Value::String(s.clone()),
        CellValue::Named { name, fields } => {
            let mut members = record_to_map(fields);
            members.insert("name".to_string(), Value::String(name.clone()));
            Value::Object(members)
        }
        CellValue::Record(fields) => Value::Object(record_to_map(fields)),
    }
}

fn record_to_map(fields: &BTreeMap<String, CellValue>) -> Map<String, Value> {
    fields
        .iter()
        .map(|(key, v)| (key.clone(), to_json(v)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalars() {
        assert_eq!(from_json(&json!(null)), CellValue::Empty);
        assert_eq!(from_json(&json!(true)), CellValue::Boolean(true));
        assert_eq!(from_json(&json!(42)), CellValue::Number(42.0));
        assert_eq!(from_json(&json!("USD")), CellValue::string("USD"));
    }

    #[test]
    fn test_named_record() {
        let value = from_json(&json!({"name": "Swap 5Y", "nodeId": "N7"}));
        assert_eq!(value.name(), Some("Swap 5Y"));
        assert_eq!(value.field("nodeId"), Some(&CellValue::string("N7")));
        assert_eq!(value.field("name"), None);
    }

    #[test]
    fn test_empty_name_stays_named() {
        let value = from_json(&json!({"name": ""}));
        assert_eq!(value.label(), CellValue::string(""));
    }

    #[test]
    fn test_non_string_name_is_a_plain_record() {
        let value = from_json(&json!({"name": 3, "nodeId": "N1"}));
        assert_eq!(value.name(), None);
        assert_eq!(value.field("name"), Some(&CellValue::Number(3.0)));
        assert_eq!(value.label(), CellValue::Number(3.0));
    }

    #[test]
    fn test_array_becomes_indexed_record() {
        let value = from_json(&json!([1.5, "x"]));
        assert_eq!(value.field("0"), Some(&CellValue::Number(1.5)));
        assert_eq!(value.field("1"), Some(&CellValue::string("x")));
    }

    #[test]
    fn test_encode_named() {
        let value = from_json(&json!({"name": "RowX", "id": 1}));
        assert_eq!(to_json(&value), json!({"name": "RowX", "id": 1.0}));
        assert_eq!(to_json(&CellValue::Number(f64::NAN)), Value::Null);
    }
}
