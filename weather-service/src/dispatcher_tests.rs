//! Tests for the weather tool dispatcher

#[cfg(test)]
mod tests {
    use super::super::dispatcher::*;
    use crate::error::WeatherError;
    use crate::forecast::Forecast;
    use crate::provider::WeatherProvider;
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tracing::field::{Field, Visit};
    use tracing::{Dispatch, Event, Level, Subscriber};
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::Layer;
    use weather_mcp_protocol::{CallToolRequestParam, ErrorCode, Error as McpError, PaginatedRequestParam};
    use weather_mcp_server::McpBackend;

    /// Answers from a fixed table and counts lookups
    #[derive(Default)]
    struct StubProvider {
        forecasts: HashMap<String, Forecast>,
        failure: Option<String>,
        delay: Option<Duration>,
        calls: AtomicUsize,
    }

    impl StubProvider {
        fn with(mut self, location: &str, temperature: i32, description: &str) -> Self {
            self.forecasts.insert(
                location.to_string(),
                Forecast {
                    temperature,
                    description: description.to_string(),
                    location: location.to_string(),
                    ..Forecast::default()
                },
            );
            self
        }

        fn failing(message: &str) -> Self {
            Self {
                failure: Some(message.to_string()),
                ..Self::default()
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl WeatherProvider for StubProvider {
        async fn get_forecast(&self, location: &str) -> Result<Forecast, WeatherError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if let Some(message) = &self.failure {
                return Err(WeatherError::Request(message.clone()));
            }
            self.forecasts
                .get(location)
                .cloned()
                .ok_or_else(|| WeatherError::malformed(format!("no data for {location}")))
        }
    }

    /// Collects (level, message) pairs
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<(Level, String)>>>);

    struct MessageVisitor(String);

    impl Visit for MessageVisitor {
        fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
            if field.name() == "message" {
                self.0 = format!("{value:?}");
            }
        }
    }

    impl<S: Subscriber> Layer<S> for Captured {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let mut visitor = MessageVisitor(String::new());
            event.record(&mut visitor);
            self.0
                .lock()
                .unwrap()
                .push((*event.metadata().level(), visitor.0));
        }
    }

    impl Captured {
        fn dispatch(&self) -> Dispatch {
            Dispatch::new(tracing_subscriber::registry().with(self.clone()))
        }

        fn at(&self, level: Level) -> Vec<String> {
            self.0
                .lock()
                .unwrap()
                .iter()
                .filter(|(l, _)| *l == level)
                .map(|(_, message)| message.clone())
                .collect()
        }
    }

    fn call(name: &str, arguments: Value) -> CallToolRequestParam {
        CallToolRequestParam::new(name, arguments)
    }

    fn text_of(result: &weather_mcp_protocol::CallToolResult) -> Value {
        assert_eq!(result.content.len(), 1);
        serde_json::from_str(result.content[0].as_text().unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_unknown_tool_never_reaches_provider() {
        let provider = Arc::new(StubProvider::default().with("Paris", 72, "Sunny"));
        let dispatcher = ToolDispatcher::new(provider.clone());

        let result = dispatcher
            .call_tool(call("get_forecast", json!({"location_name": "Paris"})))
            .await;

        assert_matches!(result, Err(DispatchError::UnknownTool(name)) if name == "get_forecast");
        assert_eq!(provider.calls(), 0);
    }

    // A missing location_name is reported as a call error instead of
    // failing inside the lookup.
    #[tokio::test]
    async fn test_missing_location_is_invalid_arguments() {
        let provider = Arc::new(StubProvider::default().with("Paris", 72, "Sunny"));
        let dispatcher = ToolDispatcher::new(provider.clone());

        let result = dispatcher.call_tool(call(TOOL_NAME, json!({}))).await;
        assert_matches!(result, Err(DispatchError::InvalidArguments(msg)) if msg.contains("location_name"));

        let result = dispatcher
            .call_tool(CallToolRequestParam {
                name: TOOL_NAME.to_string(),
                arguments: None,
            })
            .await;
        assert_matches!(result, Err(DispatchError::InvalidArguments(_)));

        assert_eq!(provider.calls(), 0);
    }

    // The lookup is only attempted with a usable location; a blank or
    // non-string value is rejected up front.
    #[tokio::test]
    async fn test_malformed_location_is_invalid_arguments() {
        let provider = Arc::new(StubProvider::default());
        let dispatcher = ToolDispatcher::new(provider.clone());

        for arguments in [
            json!({"location_name": ""}),
            json!({"location_name": "   "}),
            json!({"location_name": 42}),
            json!("Paris"),
            json!(["Paris"]),
        ] {
            let result = dispatcher.call_tool(call(TOOL_NAME, arguments.clone())).await;
            assert_matches!(
                result,
                Err(DispatchError::InvalidArguments(_)),
                "arguments {arguments} should be rejected"
            );
        }

        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_successful_lookup() {
        let provider = Arc::new(StubProvider::default().with("Paris", 72, "Sunny"));
        let dispatcher = ToolDispatcher::new(provider.clone());

        let result = dispatcher
            .call_tool(call(TOOL_NAME, json!({"location_name": "Paris"})))
            .await
            .unwrap();

        assert_eq!(result.is_error, Some(false));
        let report = text_of(&result);
        assert_eq!(report["currently"]["temperature"], 72);
        assert_eq!(report["currently"]["description"], "Sunny");
        assert_eq!(provider.calls(), 1);

        let text = result.content[0].as_text().unwrap();
        assert!(text.contains("\n  \"currently\": {\n    \"temperature\": 72,"));
    }

    #[tokio::test]
    async fn test_location_is_trimmed() {
        let provider = Arc::new(StubProvider::default().with("Paris", 72, "Sunny"));
        let dispatcher = ToolDispatcher::new(provider);

        let result = dispatcher
            .call_tool(call(TOOL_NAME, json!({"location_name": "  Paris "})))
            .await
            .unwrap();
        assert_eq!(text_of(&result)["currently"]["location"], "Paris");
    }

    #[tokio::test]
    async fn test_provider_failure_is_logged_once() {
        let captured = Captured::default();
        let dispatcher = ToolDispatcher::new(StubProvider::failing("network unreachable"))
            .with_logger(captured.dispatch());

        let result = dispatcher
            .call_tool(call(TOOL_NAME, json!({"location_name": "Paris"})))
            .await;

        let err = result.unwrap_err();
        assert_matches!(&err, DispatchError::ProviderFailure(msg) if msg.contains("network unreachable"));
        assert!(err.to_string().contains("network unreachable"));

        let errors = captured.at(Level::ERROR);
        assert_eq!(errors.len(), 1, "unexpected error log entries: {errors:?}");
        assert!(errors[0].contains("network unreachable"));
    }

    #[tokio::test]
    async fn test_every_call_is_logged_at_debug() {
        let captured = Captured::default();
        let dispatcher = ToolDispatcher::new(StubProvider::default().with("Paris", 72, "Sunny"))
            .with_logger(captured.dispatch());

        dispatcher
            .call_tool(call(TOOL_NAME, json!({"location_name": "Paris"})))
            .await
            .unwrap();
        let _ = dispatcher.call_tool(call("nope", json!({}))).await;

        let received: Vec<_> = captured
            .at(Level::DEBUG)
            .into_iter()
            .filter(|m| m.starts_with("Tool call received"))
            .collect();
        assert_eq!(received.len(), 2);
        assert_eq!(captured.at(Level::ERROR).len(), 1);
    }

    #[tokio::test]
    async fn test_timeout_is_a_provider_failure() {
        let provider = StubProvider {
            delay: Some(Duration::from_millis(200)),
            ..StubProvider::default().with("Paris", 72, "Sunny")
        };
        let dispatcher = ToolDispatcher::new(provider).with_timeout(Duration::from_millis(20));

        let result = dispatcher
            .call_tool(call(TOOL_NAME, json!({"location_name": "Paris"})))
            .await;
        assert_matches!(result, Err(DispatchError::ProviderFailure(msg)) if msg.contains("timed out"));
    }

    #[tokio::test]
    async fn test_list_tools_is_stable() {
        let dispatcher = ToolDispatcher::new(StubProvider::default());

        let first = tokio_test::assert_ok!(dispatcher.list_tools(PaginatedRequestParam::default()).await);
        let second = tokio_test::assert_ok!(dispatcher.list_tools(PaginatedRequestParam::default()).await);

        assert_eq!(first, second);
        assert_eq!(first.tools.len(), 1);
        assert_eq!(first.tools[0].name, "get_current_weather");
        assert_eq!(first.tools[0].required_arguments(), vec!["location_name"]);
        assert_eq!(first.tools[0].input_schema["properties"]["location_name"]["type"], "string");
    }

    #[tokio::test]
    async fn test_concurrent_calls_are_independent() {
        let provider = StubProvider {
            delay: Some(Duration::from_millis(20)),
            ..StubProvider::default()
                .with("Paris", 72, "Sunny")
                .with("Tokyo", 55, "Light rain")
        };
        let dispatcher = Arc::new(ToolDispatcher::new(provider));

        let paris = {
            let dispatcher = dispatcher.clone();
            tokio::spawn(async move {
                dispatcher
                    .call_tool(call(TOOL_NAME, json!({"location_name": "Paris"})))
                    .await
            })
        };
        let tokyo = {
            let dispatcher = dispatcher.clone();
            tokio::spawn(async move {
                dispatcher
                    .call_tool(call(TOOL_NAME, json!({"location_name": "Tokyo"})))
                    .await
            })
        };

        let paris = text_of(&paris.await.unwrap().unwrap());
        let tokyo = text_of(&tokyo.await.unwrap().unwrap());

        assert_eq!(paris["currently"]["temperature"], 72);
        assert_eq!(paris["currently"]["description"], "Sunny");
        assert_eq!(tokyo["currently"]["temperature"], 55);
        assert_eq!(tokyo["currently"]["description"], "Light rain");
    }

    #[test]
    fn test_errors_map_to_protocol_errors() {
        let error: McpError = DispatchError::UnknownTool("nope".to_string()).into();
        assert_eq!(error.code, ErrorCode::ToolNotFound);
        assert_eq!(error.message, "Unknown tool: nope");

        let error: McpError = DispatchError::InvalidArguments("Required argument 'location_name' is missing".to_string()).into();
        assert_eq!(error.code, ErrorCode::InvalidParams);

        let error: McpError = DispatchError::ProviderFailure("network unreachable".to_string()).into();
        assert_eq!(error.code, ErrorCode::InternalError);
        assert_eq!(error.message, "Weather API error: network unreachable");
    }

    #[test]
    fn test_weather_arguments_parse() {
        let schema = weather_tool().input_schema;

        let args = WeatherArguments::parse(Some(&json!({"location_name": "Tokyo", "extra": 1})), &schema).unwrap();
        assert_eq!(args.location_name, "Tokyo");

        assert!(WeatherArguments::parse(Some(&json!({"location_name": null})), &schema).is_err());
    }

    #[test]
    fn test_server_info() {
        let dispatcher = ToolDispatcher::new(StubProvider::default());
        let info = dispatcher.get_server_info();
        assert_eq!(info.server_info.name, SERVER_NAME);
        assert!(info.capabilities.tools.is_some());
        assert!(info.instructions.unwrap().contains(TOOL_NAME));
    }
}
