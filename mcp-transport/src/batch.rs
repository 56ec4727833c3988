//! JSON-RPC single and batch message handling

use crate::{
    validation::{validate_jsonrpc_message, MessageType},
    RequestHandler, TransportError,
};
use weather_mcp_protocol::{Error as McpError, Request, Response};
use serde_json::Value;
use tracing::{debug, warn};

/// A JSON-RPC message that can be either single or batch
#[derive(Debug, Clone)]
pub enum JsonRpcMessage {
    Single(Value),
    Batch(Vec<Value>),
}

impl JsonRpcMessage {
    /// Parse a JSON string into a JsonRpcMessage
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        match serde_json::from_str::<Value>(text)? {
            Value::Array(values) => Ok(JsonRpcMessage::Batch(values)),
            value => Ok(JsonRpcMessage::Single(value)),
        }
    }

    /// Convert to a single-line JSON string
    pub fn to_string(&self) -> Result<String, serde_json::Error> {
        match self {
            JsonRpcMessage::Single(value) => serde_json::to_string(value),
            JsonRpcMessage::Batch(values) => serde_json::to_string(values),
        }
    }
}

/// Run every request and notification of a message through the handler
///
/// Returns `None` when nothing needs to be written back (notifications and
/// stray responses only). An invalid single message or an empty batch is an
/// error for the caller to report; an invalid element inside a batch gets its
/// own error entry and the other elements are still answered.
pub async fn process_message(
    message: JsonRpcMessage,
    handler: &RequestHandler,
) -> Result<Option<JsonRpcMessage>, TransportError> {
    match message {
        JsonRpcMessage::Single(value) => {
            let kind = validate_jsonrpc_message(&value)
                .map_err(|e| TransportError::Protocol(e.to_string()))?;
            match dispatch_value(value, kind, handler).await? {
                Some(response) => Ok(Some(JsonRpcMessage::Single(to_value(&response)?))),
                None => Ok(None),
            }
        }
        JsonRpcMessage::Batch(values) => {
            if values.is_empty() {
                return Err(TransportError::Protocol("Batch cannot be empty".to_string()));
            }

            let mut responses = Vec::new();
            for value in values {
                let id = value.get("id").cloned().unwrap_or(Value::Null);
                let outcome = match validate_jsonrpc_message(&value) {
                    Ok(kind) => dispatch_value(value, kind, handler).await,
                    Err(e) => Err(TransportError::Protocol(e.to_string())),
                };

                match outcome {
                    Ok(Some(response)) => responses.push(to_value(&response)?),
                    Ok(None) => {}
                    Err(e) => {
                        warn!("Invalid batch element: {}", e);
                        let error = create_error_response(
                            McpError::invalid_request(format!("Invalid JSON-RPC: {e}")),
                            id,
                        );
                        responses.push(to_value(&error)?);
                    }
                }
            }

            if responses.is_empty() {
                Ok(None)
            } else {
                Ok(Some(JsonRpcMessage::Batch(responses)))
            }
        }
    }
}

async fn dispatch_value(
    value: Value,
    kind: MessageType,
    handler: &RequestHandler,
) -> Result<Option<Response>, TransportError> {
    if kind == MessageType::Response {
        debug!("Ignoring response message from client");
        return Ok(None);
    }

    let request: Request = serde_json::from_value(value)
        .map_err(|e| TransportError::Protocol(format!("Malformed request: {e}")))?;

    if request.is_notification() {
        debug!("Processing notification: {}", request.method);
        let _ = handler(request).await;
        return Ok(None);
    }

    debug!("Processing request: {} (ID: {})", request.method, request.id);
    Ok(Some(handler(request).await))
}

fn to_value(response: &Response) -> Result<Value, TransportError> {
    serde_json::to_value(response)
        .map_err(|e| TransportError::Protocol(format!("Failed to serialize response: {e}")))
}

/// Create an error response for a malformed request
pub fn create_error_response(error: McpError, request_id: Value) -> Response {
    Response::failure(request_id, error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ResponseFuture;
    use serde_json::json;

    fn echo_handler() -> RequestHandler {
        Box::new(|request: Request| -> ResponseFuture {
            Box::pin(async move { Response::success(request.id, json!({"method": request.method})) })
        })
    }

    #[test]
    fn test_jsonrpc_message_parsing() {
        let single = JsonRpcMessage::parse(r#"{"jsonrpc": "2.0", "method": "ping", "id": 1}"#).unwrap();
        assert!(matches!(single, JsonRpcMessage::Single(_)));

        let batch = JsonRpcMessage::parse(
            r#"[{"jsonrpc": "2.0", "method": "ping", "id": 1}, {"jsonrpc": "2.0", "method": "notifications/initialized"}]"#,
        )
        .unwrap();
        assert!(matches!(batch, JsonRpcMessage::Batch(ref v) if v.len() == 2));
    }

    #[tokio::test]
    async fn test_single_request_gets_single_response() {
        let handler = echo_handler();
        let message = JsonRpcMessage::parse(r#"{"jsonrpc": "2.0", "method": "tools/list", "id": 1}"#).unwrap();

        match process_message(message, &handler).await.unwrap() {
            Some(JsonRpcMessage::Single(value)) => {
                assert_eq!(value["id"], json!(1));
                assert_eq!(value["result"]["method"], "tools/list");
            }
            other => panic!("Expected single response, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_notification_gets_no_response() {
        let handler = echo_handler();
        let message =
            JsonRpcMessage::parse(r#"{"jsonrpc": "2.0", "method": "notifications/initialized"}"#).unwrap();
        assert!(process_message(message, &handler).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_batch_answers_requests_only() {
        let handler = echo_handler();
        let message = JsonRpcMessage::parse(
            r#"[
                {"jsonrpc": "2.0", "method": "tools/list", "id": 1},
                {"jsonrpc": "2.0", "method": "notifications/initialized"},
                {"jsonrpc": "2.0", "result": {}, "id": 9},
                {"jsonrpc": "2.0", "method": "ping", "id": 2}
            ]"#,
        )
        .unwrap();

        match process_message(message, &handler).await.unwrap() {
            Some(JsonRpcMessage::Batch(responses)) => {
                assert_eq!(responses.len(), 2);
                assert_eq!(responses[0]["id"], json!(1));
                assert_eq!(responses[1]["id"], json!(2));
            }
            other => panic!("Expected batch response, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_batch_elements_get_their_own_errors() {
        let handler = echo_handler();
        let message = JsonRpcMessage::parse(
            r#"[
                {"jsonrpc": "2.0", "method": "ping", "id": 1},
                {"jsonrpc": "1.0", "method": "ping", "id": 2},
                42,
                {"jsonrpc": "2.0", "method": "tools/list", "id": 3}
            ]"#,
        )
        .unwrap();

        match process_message(message, &handler).await.unwrap() {
            Some(JsonRpcMessage::Batch(responses)) => {
                assert_eq!(responses.len(), 4);
                assert_eq!(responses[0]["result"]["method"], "ping");
                assert_eq!(responses[1]["id"], json!(2));
                assert_eq!(responses[1]["error"]["code"], json!(-32600));
                assert_eq!(responses[2]["id"], Value::Null);
                assert_eq!(responses[2]["error"]["code"], json!(-32600));
                assert_eq!(responses[3]["result"]["method"], "tools/list");
            }
            other => panic!("Expected batch response, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_single_message_is_an_error() {
        let handler = echo_handler();
        let message = JsonRpcMessage::parse(r#"{"jsonrpc": "2.0", "id": 1}"#).unwrap();
        assert!(process_message(message, &handler).await.is_err());
    }

    #[tokio::test]
    async fn test_empty_batch_is_rejected() {
        let handler = echo_handler();
        let message = JsonRpcMessage::parse("[]").unwrap();
        assert!(process_message(message, &handler).await.is_err());
    }

    #[test]
    fn test_create_error_response() {
        let response = create_error_response(
            McpError::parse_error("Test error"),
            json!(123),
        );
        assert_eq!(response.jsonrpc, "2.0");
        assert_eq!(response.id, json!(123));
        assert!(response.result.is_none());
        assert!(response.error.is_some());
    }
}
