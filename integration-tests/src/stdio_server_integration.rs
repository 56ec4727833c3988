//! Integration tests for the server, stdio transport and dispatcher together

use crate::test_utils::*;
use serde_json::{json, Value};
use weather_mcp_protocol::MCP_VERSION;
use weather_mcp_service::ToolDispatcher;

#[tokio::test]
async fn test_initialize_handshake() {
    let dispatcher = ToolDispatcher::new(FixedProvider::default());
    let responses = run_session(dispatcher, &[initialize(1), initialized()]).await;

    assert_eq!(responses.len(), 1, "notifications must not be answered");
    let result = &response_for(&responses, json!(1))["result"];
    assert_eq!(result["protocolVersion"], MCP_VERSION);
    assert_eq!(result["serverInfo"]["name"], "weather-mcp-server-stdio");
    assert!(result["capabilities"]["tools"].is_object());
    assert!(result["instructions"].is_string());
}

#[tokio::test]
async fn test_initialize_with_older_protocol_version() {
    let mut request = initialize(1);
    request["params"]["protocolVersion"] = json!("2024-11-05");

    let responses = run_session(ToolDispatcher::new(FixedProvider::default()), &[request]).await;
    assert_eq!(responses[0]["result"]["protocolVersion"], "2024-11-05");
}

#[tokio::test]
async fn test_tools_list_advertises_single_tool() {
    let responses = run_session(
        ToolDispatcher::new(FixedProvider::default()),
        &[
            initialize(1),
            json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}),
            json!({"jsonrpc": "2.0", "id": 3, "method": "tools/list", "params": {}}),
        ],
    )
    .await;

    let first = &response_for(&responses, json!(2))["result"];
    let second = &response_for(&responses, json!(3))["result"];
    assert_eq!(first, second);

    let tools = first["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 1);
    assert_eq!(tools[0]["name"], "get_current_weather");
    assert_eq!(tools[0]["inputSchema"]["required"], json!(["location_name"]));
    assert_eq!(
        tools[0]["inputSchema"]["properties"]["location_name"]["type"],
        "string"
    );
}

#[tokio::test]
async fn test_tool_call_returns_report() {
    let provider = shared(FixedProvider::default().with("Paris", 72, "Sunny"));
    let responses = run_session(
        ToolDispatcher::new(provider.clone()),
        &[initialize(1), call_weather(2, json!({"location_name": "Paris"}))],
    )
    .await;

    let response = response_for(&responses, json!(2));
    assert!(response.get("error").is_none());
    assert_eq!(response["result"]["isError"], false);

    let report = report_of(response);
    assert_eq!(report["currently"]["temperature"], 72);
    assert_eq!(report["currently"]["description"], "Sunny");
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn test_tool_call_errors_keep_request_id() {
    let provider = shared(FixedProvider::failing("network unreachable"));
    let responses = run_session(
        ToolDispatcher::new(provider.clone()),
        &[
            json!({
                "jsonrpc": "2.0",
                "id": "unknown",
                "method": "tools/call",
                "params": {"name": "get_forecast", "arguments": {"location_name": "Paris"}}
            }),
            call_weather(7, json!({})),
            call_weather(8, json!({"location_name": ""})),
            call_weather(9, json!({"location_name": "Paris"})),
        ],
    )
    .await;

    assert_eq!(responses.len(), 4);

    let unknown = &response_for(&responses, json!("unknown"))["error"];
    assert_eq!(unknown["code"], -32003);
    assert_eq!(unknown["message"], "Unknown tool: get_forecast");

    assert_eq!(response_for(&responses, json!(7))["error"]["code"], -32602);
    assert_eq!(response_for(&responses, json!(8))["error"]["code"], -32602);

    let failure = &response_for(&responses, json!(9))["error"];
    assert_eq!(failure["code"], -32603);
    assert!(failure["message"].as_str().unwrap().contains("network unreachable"));

    // Only the well-formed call reached the provider
    assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn test_protocol_errors() {
    let responses = run_session(
        ToolDispatcher::new(FixedProvider::default()),
        &[
            json!({"jsonrpc": "2.0", "id": 1, "method": "resources/list"}),
            json!({"jsonrpc": "2.0", "id": 2, "method": "tools/call"}),
            json!({"jsonrpc": "2.0", "id": 3, "method": "ping"}),
        ],
    )
    .await;

    assert_eq!(response_for(&responses, json!(1))["error"]["code"], -32601);
    assert_eq!(response_for(&responses, json!(2))["error"]["code"], -32602);
    assert_eq!(response_for(&responses, json!(3))["result"], json!({}));
}

#[tokio::test]
async fn test_batch_request() {
    let responses = run_session(
        ToolDispatcher::new(FixedProvider::default().with("Tokyo", 55, "Light rain")),
        &[json!([
            {"jsonrpc": "2.0", "id": 1, "method": "ping"},
            {"jsonrpc": "2.0", "method": "notifications/initialized"},
            {
                "jsonrpc": "2.0",
                "id": 2,
                "method": "tools/call",
                "params": {"name": "get_current_weather", "arguments": {"location_name": "Tokyo"}}
            }
        ])],
    )
    .await;

    assert_eq!(responses.len(), 1);
    let batch = responses[0].as_array().unwrap();
    assert_eq!(batch.len(), 2);
    assert_eq!(batch[0]["id"], 1);
    assert_eq!(report_of(&batch[1])["currently"]["temperature"], 55);
}

#[tokio::test]
async fn test_every_response_is_single_line_json() {
    let responses = run_session(
        ToolDispatcher::new(FixedProvider::default().with("Paris", 72, "Sunny")),
        &[call_weather(1, json!({"location_name": "Paris"}))],
    )
    .await;

    // run_session parses line by line, so a pretty-printed frame would fail there
    assert_eq!(responses.len(), 1);
    let text = responses[0]["result"]["content"][0]["text"].as_str().unwrap();
    assert!(text.contains('\n'), "report text itself stays pretty-printed");
    assert!(matches!(responses[0]["id"], Value::Number(_)));
}
