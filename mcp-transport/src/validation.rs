//! Message validation utilities for MCP stdio compliance

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Message contains embedded newlines")]
    EmbeddedNewlines,

    #[error("Request ID cannot be null")]
    NullRequestId,

    #[error("Message exceeds maximum size: {size} > {max}")]
    MessageTooLarge { size: usize, max: usize },

    #[error("Invalid JSON-RPC format: {0}")]
    InvalidFormat(String),
}

/// JSON-RPC message kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Request,
    Response,
    Notification,
}

/// Validates a raw message line for MCP stdio compliance
///
/// Lines are already UTF-8 by the time they reach us (`str`), so only framing
/// and size are checked here.
pub fn validate_message_string(message: &str, max_size: Option<usize>) -> Result<(), ValidationError> {
    if message.contains('\n') || message.contains('\r') {
        return Err(ValidationError::EmbeddedNewlines);
    }

    if let Some(max) = max_size {
        if message.len() > max {
            return Err(ValidationError::MessageTooLarge {
                size: message.len(),
                max,
            });
        }
    }

    Ok(())
}

/// Validates JSON-RPC message structure and ID requirements
pub fn validate_jsonrpc_message(value: &Value) -> Result<MessageType, ValidationError> {
    let obj = value.as_object().ok_or_else(|| {
        ValidationError::InvalidFormat("Message must be a JSON object".to_string())
    })?;

    if obj.get("jsonrpc").and_then(|v| v.as_str()) != Some("2.0") {
        return Err(ValidationError::InvalidFormat(
            "Missing or invalid jsonrpc field".to_string(),
        ));
    }

    if let Some(method) = obj.get("method") {
        if !method.is_string() {
            return Err(ValidationError::InvalidFormat(
                "Method must be a string".to_string(),
            ));
        }

        match obj.get("id") {
            Some(Value::Null) => Err(ValidationError::NullRequestId),
            Some(_) => Ok(MessageType::Request),
            None => Ok(MessageType::Notification),
        }
    } else if obj.contains_key("result") || obj.contains_key("error") {
        if !obj.contains_key("id") {
            return Err(ValidationError::InvalidFormat(
                "Response must have an ID".to_string(),
            ));
        }
        Ok(MessageType::Response)
    } else {
        Err(ValidationError::InvalidFormat(
            "Unknown message type".to_string(),
        ))
    }
}

/// Attempts to extract the ID from a malformed message for error responses
pub fn extract_id_from_malformed(text: &str) -> Value {
    if let Ok(Value::Object(obj)) = serde_json::from_str::<Value>(text) {
        if let Some(id) = obj.get("id") {
            return id.clone();
        }
    }

    extract_id_with_regex(text).unwrap_or(Value::Null)
}

static STRING_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""id"\s*:\s*"([^"]*)""#).expect("valid regex"));
static NUMBER_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""id"\s*:\s*(-?\d+)"#).expect("valid regex"));

fn extract_id_with_regex(text: &str) -> Option<Value> {
    if let Some(captures) = STRING_ID.captures(text) {
        return Some(Value::String(captures[1].to_string()));
    }

    NUMBER_ID
        .captures(text)
        .and_then(|captures| captures[1].parse::<i64>().ok())
        .map(|num| Value::Number(num.into()))
}
