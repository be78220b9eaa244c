//! JSON helpers shared by every processor.
//!
//! The outbound OpenRTB request and its imps are open-ended objects: publishers
//! supply arbitrary first-party data and every processor contributes a few keys.
//! Partial contributions are combined with [`merge`], which follows these rules:
//!
//! - Objects are merged key by key, recursively.
//! - Arrays and scalars in the source replace the destination value wholesale.
//!   Arrays are never merged element-wise.
//! - `null` in the source is a no-op and never clears an existing value.

use serde_json::Value;

pub type JsonObject = serde_json::Map<String, Value>;

/// Merges `source` into `destination` and returns the destination for chaining.
///
/// A missing source leaves the destination untouched.
pub fn merge<'a>(destination: &'a mut JsonObject, source: Option<&JsonObject>) -> &'a mut JsonObject {
    if let Some(source) = source {
        for (key, value) in source {
            merge_entry(destination, key, value);
        }
    }
    destination
}

/// Merges one JSON value into another.
///
/// If both sides are objects they are merged recursively, otherwise a non-null
/// source replaces the destination.
pub fn merge_value(destination: &mut Value, source: &Value) {
    match (destination, source) {
        (_, Value::Null) => {}
        (Value::Object(destination), Value::Object(source)) => {
            merge(destination, Some(source));
        }
        (slot, source) => *slot = source.clone(),
    }
}

fn merge_entry(destination: &mut JsonObject, key: &str, value: &Value) {
    if value.is_null() {
        return;
    }
    match destination.get_mut(key) {
        Some(existing) => merge_value(existing, value),
        None => {
            destination.insert(key.to_string(), value.clone());
        }
    }
}

/// Returns the object stored under `key`, if any.
pub fn object_at<'a>(object: &'a JsonObject, key: &str) -> Option<&'a JsonObject> {
    object.get(key).and_then(Value::as_object)
}

/// True when `key` holds anything other than `null`.
pub fn is_set(object: &JsonObject, key: &str) -> bool {
    object.get(key).is_some_and(|value| !value.is_null())
}

/// Loose truthiness as used by publisher-supplied flags: `null`, `false`, `0`
/// and `""` are false, everything else is true.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
