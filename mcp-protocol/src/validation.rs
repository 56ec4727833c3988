//! Validation utilities for MCP protocol types

use crate::{Error, Result};
use serde_json::{Map, Value};

/// Protocol validation utilities
pub struct Validator;

impl Validator {
    /// Validate that a string is not empty
    ///
    /// # Errors
    ///
    /// Returns an error if the string is empty or contains only whitespace
    pub fn validate_non_empty(value: &str, field_name: &str) -> Result<()> {
        if value.trim().is_empty() {
            Err(Error::invalid_params(format!(
                "{field_name} cannot be empty"
            )))
        } else {
            Ok(())
        }
    }

    /// Validate a tool name (alphanumeric with underscores and hyphens)
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty or contains invalid characters
    pub fn validate_tool_name(name: &str) -> Result<()> {
        Self::validate_non_empty(name, "Tool name")?;

        if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(Error::invalid_params(
                "Tool name must contain only alphanumeric characters, underscores, and hyphens",
            ));
        }

        Ok(())
    }

    /// Validate a tool argument bag against a tool input schema
    ///
    /// Checks that the arguments are an object, that every required property is
    /// present, and that properties declared as `"type": "string"` hold strings.
    /// Returns the argument object on success.
    ///
    /// # Errors
    ///
    /// Returns an `InvalidParams` error describing the first violation found
    pub fn validate_tool_arguments<'a>(
        args: Option<&'a Value>,
        schema: &Value,
    ) -> Result<&'a Map<String, Value>> {
        let args = match args {
            Some(Value::Object(map)) => map,
            Some(other) => {
                return Err(Error::invalid_params(format!(
                    "Tool arguments must be an object, got {}",
                    json_type_name(other)
                )));
            }
            None => return Err(Error::invalid_params("Tool arguments are missing")),
        };

        if let Some(required) = schema.get("required").and_then(|r| r.as_array()) {
            for field_name in required.iter().filter_map(|f| f.as_str()) {
                if !args.contains_key(field_name) {
                    return Err(Error::invalid_params(format!(
                        "Required argument '{field_name}' is missing"
                    )));
                }
            }
        }

        if let Some(properties) = schema.get("properties").and_then(|p| p.as_object()) {
            for (name, property) in properties {
                let declared = property.get("type").and_then(|t| t.as_str());
                if let (Some("string"), Some(value)) = (declared, args.get(name)) {
                    if !value.is_string() {
                        return Err(Error::invalid_params(format!(
                            "Argument '{name}' must be a string, got {}",
                            json_type_name(value)
                        )));
                    }
                }
            }
        }

        Ok(args)
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
