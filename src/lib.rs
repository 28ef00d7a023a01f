//! inventor-params-mcp: MCP server for CAD design parameter access
//!
//! This library exposes the numeric/text design parameters of a CAD document
//! to a local client, and persists a symbol-to-parameter mapping used for
//! formula binding inside each parameter's free-text comment field.
//!
//! # Architecture
//!
//! - **Mapping codec**: the `CA0:symbol #note` comment grammar — decode on
//!   every read, encode on every mapping write
//! - **Parameter bridge**: trait boundary to the externally-owned document;
//!   a live CAD session plugs in behind it, an in-memory snapshot backend
//!   ships with the crate
//! - **MCP server**: JSON-RPC 2.0 over stdio exposing the bridge as tools
//!
//! # Modules
//!
//! - [`mapping`] — Mapping-comment codec (the core)
//! - [`bridge`] — Parameter access trait and in-memory backend
//! - [`params`] — Read/write paths merging parameters with mappings
//! - [`config`] — Configuration loading and validation
//! - [`error`] — Configuration error types
//! - [`mcp`] — MCP protocol implementation

pub mod bridge;
pub mod config;
pub mod error;
pub mod mapping;
pub mod mcp;
pub mod params;
