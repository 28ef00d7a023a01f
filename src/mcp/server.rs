//! MCP server lifecycle and tool dispatch.
//!
//! The server walks the standard MCP lifecycle:
//!
//! 1. **Initialisation**: capability negotiation and version agreement
//! 2. **Operation**: tool calls against the parameter bridge
//! 3. **Shutdown**: EOF on stdin or a termination signal
//!
//! Tool failures (unknown parameter, read-only parameter, invalid symbol)
//! are reported as `isError` tool results so the client can show them; only
//! protocol-level problems become JSON-RPC errors.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::bridge::ParameterBridge;
use crate::mcp::protocol::{
    ErrorCode, IncomingMessage, JsonRpcError, JsonRpcErrorData, JsonRpcNotification,
    JsonRpcRequest, JsonRpcResponse, RequestId, MCP_PROTOCOL_VERSION, SERVER_NAME,
};
use crate::mcp::transport::StdioTransport;
use crate::params;

/// Server state in the MCP lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// Waiting for the initialize request.
    AwaitingInit,
    /// Initialize received, waiting for the initialized notification.
    Initialising,
    /// Ready for normal operation.
    Running,
    /// Shutdown in progress.
    ShuttingDown,
}

/// Server capabilities advertised during initialisation.
#[derive(Debug, Clone, Serialize)]
pub struct ServerCapabilities {
    /// Tool-related capabilities.
    pub tools: ToolCapabilities,
}

impl Default for ServerCapabilities {
    fn default() -> Self {
        Self {
            tools: ToolCapabilities { list_changed: false },
        }
    }
}

/// Tool-specific capabilities.
#[derive(Debug, Clone, Serialize)]
pub struct ToolCapabilities {
    /// Whether the tool list can change during the session. It cannot.
    #[serde(rename = "listChanged")]
    pub list_changed: bool,
}

/// Server information for the initialisation response.
#[derive(Debug, Clone, Serialize)]
pub struct ServerInfo {
    /// Server name.
    pub name: String,
    /// Server version.
    pub version: String,
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self {
            name: SERVER_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Parameters of the initialize request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    /// Protocol version requested by the client.
    pub protocol_version: String,
    /// Client capabilities (unused).
    #[serde(default)]
    pub capabilities: Value,
    /// Client information (unused).
    #[serde(default)]
    pub client_info: Value,
}

/// A tool definition for the tools/list response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// Unique tool name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// JSON Schema for the tool's input parameters.
    pub input_schema: Value,
}

/// Parameters of a tools/call request.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCallParams {
    /// Name of the tool to call.
    pub name: String,
    /// Arguments for the tool.
    #[serde(default)]
    pub arguments: Value,
}

/// Content item in a tool call response.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    /// Text content.
    Text {
        /// The text content.
        text: String,
    },
}

/// Result of a tool call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallResult {
    /// Content returned by the tool.
    pub content: Vec<ToolContent>,
    /// Whether the tool call resulted in an error.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl ToolCallResult {
    /// Creates a successful text result.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text { text: text.into() }],
            is_error: false,
        }
    }

    /// Creates an error text result.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text {
                text: message.into(),
            }],
            is_error: true,
        }
    }

    fn json(value: &Value) -> Self {
        Self::text(pretty(value))
    }

    fn json_error(value: &Value) -> Self {
        Self::error(pretty(value))
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// The MCP server exposing one document's parameters.
pub struct McpServer {
    state: ServerState,
    transport: StdioTransport,
    protocol_version: Option<String>,
    bridge: Box<dyn ParameterBridge>,
    namespace: String,
}

impl McpServer {
    /// Creates a server over the given bridge, writing mappings under
    /// `namespace`.
    #[must_use]
    pub fn new(bridge: Box<dyn ParameterBridge>, namespace: String) -> Self {
        Self {
            state: ServerState::AwaitingInit,
            transport: StdioTransport::new(),
            protocol_version: None,
            bridge,
            namespace,
        }
    }

    /// Returns the current server state.
    #[must_use]
    pub const fn state(&self) -> ServerState {
        self.state
    }

    /// Runs the server main loop until shutdown.
    ///
    /// # Errors
    ///
    /// Returns an error if transport I/O fails.
    pub async fn run(&mut self) -> std::io::Result<()> {
        self.run_with_shutdown().await
    }

    /// Runs the main loop and handles shutdown signals.
    #[cfg(unix)]
    async fn run_with_shutdown(&mut self) -> std::io::Result<()> {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigint = signal(SignalKind::interrupt()).map_err(std::io::Error::other)?;
        let mut sigterm = signal(SignalKind::terminate()).map_err(std::io::Error::other)?;

        loop {
            tokio::select! {
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT, initiating graceful shutdown");
                    self.state = ServerState::ShuttingDown;
                    return Ok(());
                }

                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM, initiating graceful shutdown");
                    self.state = ServerState::ShuttingDown;
                    return Ok(());
                }

                line_result = self.transport.read_line() => {
                    if self.handle_transport_result(line_result).await? {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Runs the main loop and handles shutdown signals.
    #[cfg(windows)]
    async fn run_with_shutdown(&mut self) -> std::io::Result<()> {
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                _ = &mut ctrl_c => {
                    tracing::info!("Received Ctrl+C, initiating graceful shutdown");
                    self.state = ServerState::ShuttingDown;
                    return Ok(());
                }

                line_result = self.transport.read_line() => {
                    if self.handle_transport_result(line_result).await? {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Handles one transport read. Returns `true` on shutdown.
    async fn handle_transport_result(
        &mut self,
        line_result: std::io::Result<Option<String>>,
    ) -> std::io::Result<bool> {
        let Some(line) = line_result? else {
            // EOF - client went away.
            self.state = ServerState::ShuttingDown;
            return Ok(true);
        };

        if line.trim().is_empty() {
            return Ok(false);
        }

        self.handle_line(&line).await?;

        Ok(self.state == ServerState::ShuttingDown)
    }

    async fn handle_line(&mut self, line: &str) -> std::io::Result<()> {
        use crate::mcp::protocol::parse_message;

        match parse_message(line) {
            Ok(msg) => self.handle_message(msg).await,
            Err(error) => self.transport.write_error(&error).await,
        }
    }

    async fn handle_message(&mut self, msg: IncomingMessage) -> std::io::Result<()> {
        match msg {
            IncomingMessage::Request(req) => self.handle_request(req).await,
            IncomingMessage::Notification(ref notif) => {
                self.handle_notification(notif);
                Ok(())
            }
        }
    }

    async fn handle_request(&mut self, req: JsonRpcRequest) -> std::io::Result<()> {
        let response = match req.method.as_str() {
            "initialize" => self.handle_initialize(&req),
            "tools/list" => self.handle_tools_list(&req),
            "tools/call" => self.handle_tools_call(&req),
            "ping" => Ok(Self::handle_ping(&req)),
            _ => Err(JsonRpcError::method_not_found(req.id.clone(), &req.method)),
        };

        match response {
            Ok(resp) => self.transport.write_response(&resp).await,
            Err(error) => self.transport.write_error(&error).await,
        }
    }

    fn handle_notification(&mut self, notif: &JsonRpcNotification) {
        if notif.method == "notifications/initialized" && self.state == ServerState::Initialising {
            self.state = ServerState::Running;
        }
    }

    fn handle_initialize(&mut self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, JsonRpcError> {
        if self.state != ServerState::AwaitingInit {
            return Err(JsonRpcError::new(
                Some(req.id.clone()),
                JsonRpcErrorData::with_message(
                    ErrorCode::InvalidRequest,
                    "Server already initialised",
                ),
            ));
        }

        let _params: InitializeParams = parse_params(req)?;

        let negotiated_version = MCP_PROTOCOL_VERSION.to_string();
        self.protocol_version = Some(negotiated_version.clone());
        self.state = ServerState::Initialising;

        let result = json!({
            "protocolVersion": negotiated_version,
            "capabilities": ServerCapabilities::default(),
            "serverInfo": ServerInfo::default(),
        });

        Ok(JsonRpcResponse::success(req.id.clone(), result))
    }

    fn handle_tools_list(&self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, JsonRpcError> {
        self.require_running(&req.id)?;

        let result = json!({
            "tools": tool_definitions(),
        });

        Ok(JsonRpcResponse::success(req.id.clone(), result))
    }

    fn handle_tools_call(&mut self, req: &JsonRpcRequest) -> Result<JsonRpcResponse, JsonRpcError> {
        self.require_running(&req.id)?;

        let params: ToolCallParams = parse_params(req)?;

        let result = match params.name.as_str() {
            "list_parameters" => self.call_list_parameters(),
            "get_parameter" => self.call_get_parameter(&params.arguments),
            "set_parameter_value" => self.call_set_parameter_value(&params.arguments),
            "set_mapping" => self.call_set_mapping(&params.arguments),
            "clear_mapping" => self.call_clear_mapping(&params.arguments),
            "list_mappings" => self.call_list_mappings(),
            _ => ToolCallResult::error(format!("Unknown tool: {}", params.name)),
        };

        let result_value = serde_json::to_value(&result).map_err(|e| {
            tracing::error!(error = %e, "Failed to serialise tool call result");
            JsonRpcError::internal_error(req.id.clone(), "Failed to serialise result")
        })?;

        Ok(JsonRpcResponse::success(req.id.clone(), result_value))
    }

    fn handle_ping(req: &JsonRpcRequest) -> JsonRpcResponse {
        JsonRpcResponse::success(req.id.clone(), json!({}))
    }

    fn require_running(&self, id: &RequestId) -> Result<(), JsonRpcError> {
        if self.state != ServerState::Running {
            return Err(JsonRpcError::new(
                Some(id.clone()),
                JsonRpcErrorData::with_message(ErrorCode::InvalidRequest, "Server not initialised"),
            ));
        }
        Ok(())
    }

    // === Tool implementations ===

    fn call_list_parameters(&self) -> ToolCallResult {
        match params::list_mapped(self.bridge.as_ref()) {
            Ok(parameters) => ToolCallResult::json(&json!({
                "status": "success",
                "parameter_count": parameters.len(),
                "parameters": parameters,
            })),
            Err(e) => ToolCallResult::json_error(&json!({
                "status": "error",
                "error": e.to_string(),
            })),
        }
    }

    fn call_get_parameter(&self, arguments: &Value) -> ToolCallResult {
        let Some(name) = arguments.get("name").and_then(Value::as_str) else {
            return ToolCallResult::error("Missing required parameter: name");
        };

        let parameters = match params::list_mapped(self.bridge.as_ref()) {
            Ok(parameters) => parameters,
            Err(e) => {
                return ToolCallResult::json_error(&json!({
                    "status": "error",
                    "error": e.to_string(),
                }))
            }
        };

        parameters.into_iter().find(|p| p.name == name).map_or_else(
            || {
                ToolCallResult::json_error(&json!({
                    "status": "error",
                    "name": name,
                    "error": format!("Parameter not found: {name}"),
                }))
            },
            |parameter| {
                ToolCallResult::json(&json!({
                    "status": "success",
                    "parameter": parameter,
                }))
            },
        )
    }

    fn call_set_parameter_value(&mut self, arguments: &Value) -> ToolCallResult {
        let Some(name) = arguments.get("name").and_then(Value::as_str) else {
            return ToolCallResult::error("Missing required parameter: name");
        };
        let Some(value) = arguments.get("value").and_then(Value::as_f64) else {
            return ToolCallResult::error("Missing required parameter: value");
        };

        match params::set_value(self.bridge.as_mut(), name, value) {
            Ok(()) => ToolCallResult::json(&json!({
                "status": "success",
                "name": name,
                "value": value,
            })),
            Err(e) => ToolCallResult::json_error(&json!({
                "status": "error",
                "name": name,
                "error": e.to_string(),
            })),
        }
    }

    fn call_set_mapping(&mut self, arguments: &Value) -> ToolCallResult {
        let Some(name) = arguments.get("name").and_then(Value::as_str) else {
            return ToolCallResult::error("Missing required parameter: name");
        };
        let Some(symbol) = arguments.get("symbol").and_then(Value::as_str) else {
            return ToolCallResult::error("Missing required parameter: symbol");
        };
        let note = arguments.get("note").and_then(Value::as_str);

        let namespace = self.namespace.clone();
        match params::apply_mapping(self.bridge.as_mut(), name, symbol, note, &namespace) {
            Ok(()) => ToolCallResult::json(&json!({
                "status": "success",
                "name": name,
                "symbol": symbol,
                "note": note,
            })),
            Err(e) => ToolCallResult::json_error(&json!({
                "status": "error",
                "name": name,
                "error": e.to_string(),
            })),
        }
    }

    fn call_clear_mapping(&mut self, arguments: &Value) -> ToolCallResult {
        let Some(name) = arguments.get("name").and_then(Value::as_str) else {
            return ToolCallResult::error("Missing required parameter: name");
        };

        match params::clear_mapping(self.bridge.as_mut(), name) {
            Ok(()) => ToolCallResult::json(&json!({
                "status": "success",
                "name": name,
            })),
            Err(e) => ToolCallResult::json_error(&json!({
                "status": "error",
                "name": name,
                "error": e.to_string(),
            })),
        }
    }

    fn call_list_mappings(&self) -> ToolCallResult {
        match params::mapping_table(self.bridge.as_ref()) {
            Ok(table) => {
                let mappings: Map<String, Value> = table
                    .into_iter()
                    .map(|(symbol, name)| (symbol, Value::String(name)))
                    .collect();
                ToolCallResult::json(&json!({
                    "status": "success",
                    "mapping_count": mappings.len(),
                    "mappings": mappings,
                }))
            }
            Err(e) => ToolCallResult::json_error(&json!({
                "status": "error",
                "error": e.to_string(),
            })),
        }
    }
}

fn parse_params<T: serde::de::DeserializeOwned>(req: &JsonRpcRequest) -> Result<T, JsonRpcError> {
    req.params
        .as_ref()
        .map(|p| serde_json::from_value(p.clone()))
        .transpose()
        .map_err(|e| JsonRpcError::invalid_params(req.id.clone(), format!("Invalid params: {e}")))?
        .ok_or_else(|| JsonRpcError::invalid_params(req.id.clone(), "Missing params"))
}

/// Returns the tool list advertised to clients.
#[must_use]
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: "list_parameters".to_string(),
            description: "List every design parameter of the open document, including its \
                          value, unit, expression and the symbol/note decoded from the \
                          mapping comment (if any)."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {},
                "additionalProperties": false,
            }),
        },
        ToolDefinition {
            name: "get_parameter".to_string(),
            description: "Fetch one parameter by name, with its decoded mapping.".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "name": {
                        "type": "string",
                        "description": "Parameter name, e.g. 'd0'",
                    },
                },
                "required": ["name"],
                "additionalProperties": false,
            }),
        },
        ToolDefinition {
            name: "set_parameter_value".to_string(),
            description: "Write a new numeric value to a parameter. Fails for read-only \
                          (derived or reference) parameters."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "name": {
                        "type": "string",
                        "description": "Parameter name",
                    },
                    "value": {
                        "type": "number",
                        "description": "New value in the document's database units",
                    },
                },
                "required": ["name", "value"],
                "additionalProperties": false,
            }),
        },
        ToolDefinition {
            name: "set_mapping".to_string(),
            description: "Bind a formula symbol (and an optional note) to a parameter. The \
                          mapping is stored in the parameter's comment field. Symbols must \
                          not contain ':' and must be unique across the document."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "name": {
                        "type": "string",
                        "description": "Parameter name",
                    },
                    "symbol": {
                        "type": "string",
                        "description": "Symbol used for formula binding, e.g. 'L'",
                    },
                    "note": {
                        "type": "string",
                        "description": "Optional free-text annotation",
                    },
                },
                "required": ["name", "symbol"],
                "additionalProperties": false,
            }),
        },
        ToolDefinition {
            name: "clear_mapping".to_string(),
            description: "Remove the mapping from a parameter by clearing its comment field."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "name": {
                        "type": "string",
                        "description": "Parameter name",
                    },
                },
                "required": ["name"],
                "additionalProperties": false,
            }),
        },
        ToolDefinition {
            name: "list_mappings".to_string(),
            description: "List only the mapped parameters, as a symbol-to-parameter-name \
                          table."
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {},
                "additionalProperties": false,
            }),
        },
    ]
}
