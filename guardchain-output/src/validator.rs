//! Structural validation of parsed output against a JSON schema.
//!
//! This is deliberately a subset of JSON Schema: `type`, `required`,
//! `properties`, `items`, and `enum` cover what constrained-output
//! prompts actually state. Validation collects every violation with a
//! JSON-path location instead of stopping at the first, so a re-ask
//! prompt can list all problems at once.

use serde_json::Value as JsonValue;

use crate::error::SchemaViolation;

/// Validate a value against a JSON-schema object.
///
/// Returns all violations found; an empty vector means the value
/// conforms.
#[must_use]
pub fn validate_schema(value: &JsonValue, schema: &JsonValue) -> Vec<SchemaViolation> {
    let mut violations = Vec::new();
    check(value, schema, "$", &mut violations);
    violations
}

fn check(value: &JsonValue, schema: &JsonValue, path: &str, out: &mut Vec<SchemaViolation>) {
    if let Some(expected) = schema.get("type").and_then(JsonValue::as_str) {
        if !type_matches(value, expected) {
            out.push(SchemaViolation::new(
                path,
                format!("expected {expected}, got {}", type_name(value)),
            ));
            // Structure below a type mismatch is meaningless.
            return;
        }
    }

    if let Some(choices) = schema.get("enum").and_then(JsonValue::as_array) {
        if !choices.contains(value) {
            out.push(SchemaViolation::new(
                path,
                format!("value {value} is not one of the allowed choices"),
            ));
        }
    }

    if let Some(object) = value.as_object() {
        if let Some(required) = schema.get("required").and_then(JsonValue::as_array) {
            for key in required.iter().filter_map(JsonValue::as_str) {
                if !object.contains_key(key) {
                    out.push(SchemaViolation::new(
                        path,
                        format!("missing required field `{key}`"),
                    ));
                }
            }
        }
        if let Some(properties) = schema.get("properties").and_then(JsonValue::as_object) {
            for (key, subschema) in properties {
                if let Some(subvalue) = object.get(key) {
                    check(subvalue, subschema, &format!("{path}.{key}"), out);
                }
            }
        }
    }

    if let (Some(items), Some(schema_items)) = (value.as_array(), schema.get("items")) {
        for (index, item) in items.iter().enumerate() {
            check(item, schema_items, &format!("{path}[{index}]"), out);
        }
    }
}

fn type_matches(value: &JsonValue, expected: &str) -> bool {
    match expected {
        "object" => value.is_object(),
        "array" => value.is_array(),
        "string" => value.is_string(),
        // JSON Schema treats integers as numbers too.
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "boolean" => value.is_boolean(),
        "null" => value.is_null(),
        // Unknown type keywords are not this validator's business.
        _ => true,
    }
}

fn type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
