//! JSON extension merge
//!
//! Structural merge for JSON extensions.
//!
//! ## Rules
//!
//! - Both roots must be of the same JSON kind, otherwise the merge fails
//! - Array roots: source elements are appended to the target
//! - Object roots: deep merge, see [`merge_json_values`]
//! - An empty (`null`) target simply takes the source

use serde_json::Value as JsonValue;

use crate::error::{Error, Result};

/// Name of the JSON kind of a value, used in error messages.
pub fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "NULL",
        JsonValue::Bool(_) => "BOOLEAN",
        JsonValue::Number(_) => "NUMBER",
        JsonValue::String(_) => "STRING",
        JsonValue::Array(_) => "ARRAY",
        JsonValue::Object(_) => "OBJECT",
    }
}

/// Merge the content of a source JSON extension into a target one.
///
/// # Arguments
///
/// * `name` - The extension name, for error reporting
/// * `target` - The target extension content (modified in place)
/// * `source` - The source extension content
///
/// # Errors
///
/// Returns `Error::JsonTypeMismatch` if the two roots are different JSON
/// kinds.
pub fn merge_json_extension(name: &str, target: &mut JsonValue, source: &JsonValue) -> Result<()> {
    if target.is_null() {
        *target = source.clone();
        return Ok(());
    }
    if source.is_null() {
        return Ok(());
    }
    if std::mem::discriminant(target) != std::mem::discriminant(source) {
        return Err(Error::JsonTypeMismatch {
            name: name.to_string(),
            target_type: json_kind(target).to_string(),
            source_type: json_kind(source).to_string(),
        });
    }
    merge_json_values(target, source);
    Ok(())
}

/// Recursively merge source JSON value into target
///
/// Handles different JSON types appropriately:
/// - Objects: keys missing in the target are added, nested objects are
///   merged recursively, arrays are concatenated and anything else is
///   replaced by the source value, including when the kinds differ
/// - Arrays: source items are appended to the target
/// - Scalars: Replace target with source
///
/// # Arguments
///
/// * `target` - The target value to merge into (modified in place)
/// * `source` - The source value to merge from
pub fn merge_json_values(target: &mut JsonValue, source: &JsonValue) {
    match (target, source) {
        (JsonValue::Object(target_map), JsonValue::Object(source_map)) => {
            for (key, value) in source_map {
                match target_map.get_mut(key) {
                    Some(existing) if existing.is_object() && value.is_object() => {
                        merge_json_values(existing, value);
                    }
                    Some(existing) if existing.is_array() && value.is_array() => {
                        merge_json_values(existing, value);
                    }
                    Some(existing) => *existing = value.clone(),
                    None => {
                        target_map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (JsonValue::Array(target_array), JsonValue::Array(source_array)) => {
            target_array.extend(source_array.iter().cloned());
        }
        (target, source) => *target = source.clone(),
    }
}
