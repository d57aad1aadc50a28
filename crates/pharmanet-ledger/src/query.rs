//! # Rich-Query Selectors
//!
//! A subset of the CouchDB Mango selector language, enough for contracts to
//! list records by asset type and attribute:
//!
//! ```text
//! {"selector": {"assetType": "medicine", "manufacturer": {"$in": ["Org1", "Org4"]}}}
//! ```
//!
//! Supported conditions per field: literal equality, `$eq`, `$ne`, `$in`,
//! `$exists`, and nested objects (or dotted paths such as `"a.b"`). All
//! field conditions are combined with AND. Values that are not JSON objects
//! never match.

use serde_json::{Map, Value};

use crate::error::LedgerError;

/// A parsed selector.
#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    fields: Map<String, Value>,
}

impl Selector {
    /// Parse a query string of the form `{"selector": {...}}`.
    ///
    /// # Errors
    ///
    /// `LedgerError::InvalidQuery` if the string is not JSON, has no
    /// `selector` object, or uses an unsupported operator.
    pub fn parse(query: &str) -> Result<Self, LedgerError> {
        let doc: Value = serde_json::from_str(query)
            .map_err(|e| LedgerError::InvalidQuery(format!("not JSON: {e}")))?;
        let fields = doc
            .get("selector")
            .and_then(Value::as_object)
            .cloned()
            .ok_or_else(|| LedgerError::InvalidQuery("missing \"selector\" object".into()))?;
        validate_operators(&fields)?;
        Ok(Self { fields })
    }

    /// Whether the raw stored bytes match this selector.
    pub fn matches_bytes(&self, raw: &[u8]) -> bool {
        match serde_json::from_slice::<Value>(raw) {
            Ok(doc) => self.matches(&doc),
            Err(_) => false,
        }
    }

    /// Whether a JSON document matches this selector.
    pub fn matches(&self, doc: &Value) -> bool {
        match doc.as_object() {
            Some(obj) => matches_fields(&self.fields, obj),
            None => false,
        }
    }
}

fn validate_operators(fields: &Map<String, Value>) -> Result<(), LedgerError> {
    for cond in fields.values() {
        if let Value::Object(ops) = cond {
            if is_operator_object(ops) {
                for (op, arg) in ops {
                    match op.as_str() {
                        "$eq" | "$ne" => {}
                        "$in" if arg.is_array() => {}
                        "$exists" if arg.is_boolean() => {}
                        "$in" | "$exists" => {
                            return Err(LedgerError::InvalidQuery(format!(
                                "bad argument for {op}: {arg}"
                            )))
                        }
                        other => {
                            return Err(LedgerError::InvalidQuery(format!(
                                "unsupported operator {other}"
                            )))
                        }
                    }
                }
            } else {
                validate_operators(ops)?;
            }
        }
    }
    Ok(())
}

fn is_operator_object(obj: &Map<String, Value>) -> bool {
    !obj.is_empty() && obj.keys().all(|k| k.starts_with('$'))
}

fn lookup<'a>(obj: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut parts = path.split('.');
    let mut current = obj.get(parts.next()?)?;
    for part in parts {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}

fn matches_fields(fields: &Map<String, Value>, obj: &Map<String, Value>) -> bool {
    fields
        .iter()
        .all(|(path, cond)| matches_condition(lookup(obj, path), cond))
}

fn matches_condition(field: Option<&Value>, cond: &Value) -> bool {
    match cond {
        Value::Object(ops) if is_operator_object(ops) => {
            ops.iter().all(|(op, arg)| match op.as_str() {
                "$eq" => field == Some(arg),
                "$ne" => field != Some(arg),
                "$in" => match (field, arg.as_array()) {
                    (Some(v), Some(candidates)) => candidates.contains(v),
                    _ => false,
                },
                "$exists" => arg.as_bool() == Some(field.is_some()),
                _ => false,
            })
        }
        Value::Object(nested) => match field.and_then(Value::as_object) {
            Some(inner) => matches_fields(nested, inner),
            None => false,
        },
        literal => field == Some(literal),
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    proptest! {
        #[test]
        fn literal_equality_agrees_with_field_value(
            tag in "[A-Za-z]{1,12}",
            other in "[A-Za-z]{1,12}",
        ) {
            let s = Selector::parse(&json!({"selector": {"assetType": tag.clone()}}).to_string()).unwrap();
            let same = s.matches(&json!({"assetType": tag.clone()}));
            let different = s.matches(&json!({"assetType": other.clone()}));
            prop_assert!(same);
            prop_assert_eq!(different, tag == other);
        }
    }
}
