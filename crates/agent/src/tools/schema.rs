//! Argument validation against a tool's declared parameter schema
//!
//! Covers the subset of JSON schema the toolkit declares: an object with
//! typed `properties`, a `required` list and optional `additionalProperties`.

use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaViolation {
    #[error("expected a JSON object of arguments, got {0}")]
    NotAnObject(&'static str),

    #[error("missing required field '{0}'")]
    MissingField(String),

    #[error("field '{field}' must be {expected}, got {found}")]
    WrongType {
        field: String,
        expected: String,
        found: &'static str,
    },

    #[error("unexpected field '{0}'")]
    UnexpectedField(String),
}

/// Check `args` against `schema`, returning the arguments as an object.
/// `null` is treated as an empty object.
pub fn validate_arguments(schema: &Value, args: &Value) -> Result<Value, SchemaViolation> {
    let args = match args {
        Value::Object(map) => map.clone(),
        Value::Null => Map::new(),
        other => return Err(SchemaViolation::NotAnObject(type_name(other))),
    };

    let empty = Map::new();
    let properties = schema
        .get("properties")
        .and_then(Value::as_object)
        .unwrap_or(&empty);

    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for field in required.iter().filter_map(Value::as_str) {
            match args.get(field) {
                None | Some(Value::Null) => {
                    return Err(SchemaViolation::MissingField(field.to_string()))
                }
                Some(_) => {}
            }
        }
    }

    let closed = schema.get("additionalProperties") == Some(&Value::Bool(false));

    for (field, value) in &args {
        match properties.get(field) {
            Some(prop) => {
                if let Some(expected) = prop.get("type").and_then(Value::as_str) {
                    if !value.is_null() && !matches_type(expected, value) {
                        return Err(SchemaViolation::WrongType {
                            field: field.clone(),
                            expected: expected.to_string(),
                            found: type_name(value),
                        });
                    }
                }
            }
            None if closed => return Err(SchemaViolation::UnexpectedField(field.clone())),
            None => {}
        }
    }

    Ok(Value::Object(args))
}

fn matches_type(expected: &str, value: &Value) -> bool {
    match expected {
        "string" => value.is_string(),
        "integer" => value.is_i64() || value.is_u64(),
        "number" => value.is_number(),
        "boolean" => value.is_boolean(),
        "array" => value.is_array(),
        "object" => value.is_object(),
        "null" => value.is_null(),
        // Keywords we don't model are accepted as-is
        _ => true,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
