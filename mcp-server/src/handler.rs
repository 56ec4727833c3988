//! Generic request handler for MCP protocol

use crate::{backend::McpBackend, context::RequestContext};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, field, info, instrument, Span};
use weather_mcp_protocol::*;

/// Routes JSON-RPC requests to a backend
pub struct GenericServerHandler<B: McpBackend> {
    backend: Arc<B>,
}

impl<B: McpBackend> Clone for GenericServerHandler<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
        }
    }
}

impl<B: McpBackend> GenericServerHandler<B> {
    pub fn new(backend: Arc<B>) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    /// Handle an MCP request
    ///
    /// Every failure becomes a JSON-RPC error response carrying the request id.
    #[instrument(skip(self, request), fields(method = %request.method, request_id = field::Empty))]
    pub async fn handle_request(&self, request: Request) -> Response {
        let context = RequestContext::new().with_metadata("method", request.method.clone());
        Span::current().record("request_id", field::display(context.request_id));
        debug!("Handling request: {}", request.method);

        let request_id = request.id.clone();

        let result = match request.method.as_str() {
            "initialize" => self.handle_initialize(request, context).await,
            "tools/list" => self.handle_list_tools(request).await,
            "tools/call" => self.handle_call_tool(request).await,
            "ping" => self.handle_ping(request).await,
            method if method.starts_with("notifications/") => {
                self.handle_notification(request).await
            }
            method => Err(Error::method_not_found(method)),
        };

        match result {
            Ok(response) => response,
            Err(error) => {
                error!("Request failed: {}", error);
                Response::failure(request_id, error)
            }
        }
    }

    async fn handle_initialize(
        &self,
        request: Request,
        context: RequestContext,
    ) -> std::result::Result<Response, Error> {
        let params: InitializeRequestParam = serde_json::from_value(request.params)?;
        let context = context.with_client_info(params.client_info.clone());

        let server_info = self.backend.get_server_info();
        let protocol_version = negotiate_protocol_version(&params.protocol_version);

        if let Some(client) = &context.client_info {
            info!(
                "Client {} {} connected, protocol {} (requested {})",
                client.name, client.version, protocol_version, params.protocol_version
            );
        }

        let result = InitializeResult {
            protocol_version: protocol_version.to_string(),
            capabilities: server_info.capabilities,
            server_info: server_info.server_info,
            // MCP Inspector expects a string, not null
            instructions: Some(server_info.instructions.unwrap_or_default()),
        };

        respond(request.id, &result)
    }

    async fn handle_list_tools(&self, request: Request) -> std::result::Result<Response, Error> {
        let params: PaginatedRequestParam = if request.params.is_null() {
            PaginatedRequestParam::default()
        } else {
            serde_json::from_value(request.params)?
        };

        let result = self
            .backend
            .list_tools(params)
            .await
            .map_err(|e| e.into())?;

        respond(request.id, &result)
    }

    async fn handle_call_tool(&self, request: Request) -> std::result::Result<Response, Error> {
        if request.params.is_null() {
            return Err(Error::invalid_params("Missing tools/call parameters"));
        }
        let params: CallToolRequestParam = serde_json::from_value(request.params)?;

        let result = self.backend.call_tool(params).await.map_err(|e| e.into())?;

        respond(request.id, &result)
    }

    async fn handle_ping(&self, request: Request) -> std::result::Result<Response, Error> {
        Ok(Response::success(
            request.id,
            Value::Object(Default::default()),
        ))
    }

    async fn handle_notification(&self, request: Request) -> std::result::Result<Response, Error> {
        debug!("Notification received: {}", request.method);
        Ok(Response::success(
            request.id,
            Value::Object(Default::default()),
        ))
    }
}

fn respond<T: Serialize>(id: Value, result: &T) -> std::result::Result<Response, Error> {
    let value = serde_json::to_value(result)
        .map_err(|e| Error::internal_error(format!("Failed to serialize result: {e}")))?;
    Ok(Response::success(id, value))
}
