//! Integration tests for MCP protocol handling.
//!
//! These verify the JSON-RPC 2.0 message layer and the advertised tool
//! surface, independent of any document content.

use inventor_params_mcp::mcp::protocol::{parse_message, IncomingMessage, RequestId};
use inventor_params_mcp::mcp::server::tool_definitions;

// =============================================================================
// Protocol Parsing Tests
// =============================================================================

#[test]
fn test_parse_initialize_request() {
    let json = r#"{
        "jsonrpc": "2.0",
        "id": 1,
        "method": "initialize",
        "params": {
            "protocolVersion": "2024-11-05",
            "capabilities": {},
            "clientInfo": {
                "name": "calcslive-dashboard",
                "version": "1.0.0"
            }
        }
    }"#;

    let msg = parse_message(json).unwrap();
    let IncomingMessage::Request(req) = msg else {
        panic!("Expected Request");
    };
    assert_eq!(req.method, "initialize");
    assert_eq!(req.id, RequestId::Number(1));
}

#[test]
fn test_parse_tools_call_request() {
    let json = r#"{
        "jsonrpc": "2.0",
        "id": "call-1",
        "method": "tools/call",
        "params": {
            "name": "set_mapping",
            "arguments": {
                "name": "d0",
                "symbol": "L",
                "note": "Length parameter"
            }
        }
    }"#;

    let msg = parse_message(json).unwrap();
    let IncomingMessage::Request(req) = msg else {
        panic!("Expected Request");
    };
    assert_eq!(req.method, "tools/call");
    assert_eq!(req.id, RequestId::String("call-1".to_string()));

    let params = req.params.unwrap();
    assert_eq!(params["name"], "set_mapping");
    assert_eq!(params["arguments"]["symbol"], "L");
}

#[test]
fn test_parse_initialized_notification() {
    let json = r#"{
        "jsonrpc": "2.0",
        "method": "notifications/initialized"
    }"#;

    let msg = parse_message(json).unwrap();
    let IncomingMessage::Notification(notif) = msg else {
        panic!("Expected Notification");
    };
    assert_eq!(notif.method, "notifications/initialized");
}

#[test]
fn test_parse_rejects_malformed_input() {
    assert!(parse_message("not valid json").is_err());
    assert!(parse_message("42").is_err());
    assert!(parse_message(r#"{"id": 1, "method": "ping"}"#).is_err());
    assert!(parse_message(r#"{"jsonrpc": "2.0-beta", "id": 1, "method": "ping"}"#).is_err());
}

// =============================================================================
// Tool Surface Tests
// =============================================================================

#[test]
fn test_advertised_tools() {
    let tools = tool_definitions();
    let names: Vec<_> = tools.iter().map(|t| t.name.as_str()).collect();

    assert_eq!(
        names,
        [
            "list_parameters",
            "get_parameter",
            "set_parameter_value",
            "set_mapping",
            "clear_mapping",
            "list_mappings",
        ]
    );
}

#[test]
fn test_tool_schemas_declare_required_arguments() {
    for tool in tool_definitions() {
        let schema = &tool.input_schema;
        assert_eq!(schema["type"], "object", "tool {}", tool.name);

        match tool.name.as_str() {
            "get_parameter" | "clear_mapping" => {
                assert_eq!(schema["required"], serde_json::json!(["name"]));
            }
            "set_parameter_value" => {
                assert_eq!(schema["required"], serde_json::json!(["name", "value"]));
            }
            "set_mapping" => {
                assert_eq!(schema["required"], serde_json::json!(["name", "symbol"]));
            }
            _ => assert!(schema.get("required").is_none(), "tool {}", tool.name),
        }
    }
}

#[test]
fn test_tool_definitions_serialise_camel_case() {
    let tools = tool_definitions();
    let json = serde_json::to_string(&tools).unwrap();
    assert!(json.contains("inputSchema"));
    assert!(!json.contains("input_schema"));
}
