//! MCP (Model Context Protocol) server plumbing.
//!
//! The server speaks JSON-RPC 2.0 over stdio, newline-delimited. It exposes
//! the parameter bridge as a small set of tools (list/read/write parameters,
//! set/clear/list mappings) for a local client.
//!
//! - [`protocol`] — JSON-RPC message types and parsing
//! - [`transport`] — newline-delimited stdio framing
//! - [`server`] — lifecycle and tool dispatch

pub mod protocol;
pub mod server;
pub mod transport;
