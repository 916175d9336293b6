//! IPC Layer - stdio tool server
//!
//! This module provides:
//! - Newline-delimited JSON codec
//! - JSON-RPC message types for the tool protocol
//! - The tool server loop

pub mod codec;
pub mod messages;
pub mod server;

pub use codec::{Frame, NdJsonCodec};
pub use messages::{
    CallToolParams, CallToolResult, ContentItem, ErrorCode, ListToolsResult, Methods, RpcError, RpcRequest,
    RpcResponse, ServerInfo,
};
pub use server::ToolServer;
