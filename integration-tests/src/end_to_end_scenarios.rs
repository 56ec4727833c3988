//! End-to-end scenarios against a mocked wttr.in

use crate::test_utils::*;
use httpmock::Method::GET;
use httpmock::MockServer;
use serde_json::json;
use std::time::Duration;
use weather_mcp_service::{ToolDispatcher, WttrClient, WttrConfig};

const PARIS: &str = include_str!("../../weather-service/tests/fixtures/paris_j1.json");

fn client_for(server: &MockServer) -> WttrClient {
    WttrClient::new(WttrConfig {
        base_url: Some(server.base_url()),
        retry_backoff: Duration::from_millis(10),
        request_timeout: Some(Duration::from_secs(5)),
        ..WttrConfig::default()
    })
    .unwrap()
}

#[tokio::test]
async fn test_client_session_against_wttr() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/Paris").query_param("format", "j1");
            then.status(200)
                .header("content-type", "application/json")
                .body(PARIS);
        })
        .await;

    let dispatcher = ToolDispatcher::new(client_for(&server)).with_timeout(Duration::from_secs(5));
    let responses = run_session(
        dispatcher,
        &[
            initialize(1),
            initialized(),
            json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}),
            call_weather(3, json!({"location_name": "Paris"})),
        ],
    )
    .await;

    mock.assert_async().await;
    assert_eq!(responses.len(), 3);

    let report = report_of(response_for(&responses, json!(3)));
    let currently = &report["currently"];
    assert_eq!(currently["temperature"], 72);
    assert_eq!(currently["feels_like"], 70);
    assert_eq!(currently["humidity"], 40);
    assert_eq!(currently["description"], "Sunny");
    assert_eq!(currently["wind_direction"], "NNE↙");
    assert_eq!(currently["location"], "Paris, Ile-de-France, France");
    assert_eq!(currently["forecasts"].as_array().unwrap().len(), 2);
    assert_eq!(currently["forecasts"][0]["date"], "2025-01-01");
}

#[tokio::test]
async fn test_upstream_outage_becomes_tool_error() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/Atlantis");
            then.status(503);
        })
        .await;

    let responses = run_session(
        ToolDispatcher::new(client_for(&server)),
        &[call_weather(1, json!({"location_name": "Atlantis"}))],
    )
    .await;

    mock.assert_hits_async(3).await;
    let error = &responses[0]["error"];
    assert_eq!(error["code"], -32603);
    assert!(error["message"].as_str().unwrap().starts_with("Weather API error:"));
    assert!(error["message"].as_str().unwrap().contains("503"));
}

#[tokio::test]
async fn test_session_survives_failed_call() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/Paris");
            then.status(200).body(PARIS);
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/Nowhere");
            then.status(200).body("not json");
        })
        .await;

    let responses = run_session(
        ToolDispatcher::new(client_for(&server)),
        &[
            call_weather(1, json!({"location_name": "Nowhere"})),
            call_weather(2, json!({"location_name": "Paris"})),
        ],
    )
    .await;

    assert_eq!(response_for(&responses, json!(1))["error"]["code"], -32603);
    assert_eq!(
        report_of(response_for(&responses, json!(2)))["currently"]["temperature"],
        72
    );
}
