//! Error types for binance-tools
//!
//! Centralized error handling using thiserror.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// All error types that can occur while serving a tool call
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Connection, DNS or TLS failure before any HTTP response arrived
    #[error("Network error: {0}")]
    Network(String),

    /// No response within the request deadline
    #[error("Request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    /// Upstream answered with a non-2xx status
    #[error("Upstream HTTP error {status}: {body}")]
    UpstreamHttp { status: u16, body: String },

    /// Upstream body was not valid JSON
    #[error("Decode error: {0}")]
    Decode(String),

    /// Caller-supplied arguments do not match the tool schema
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Tool name not present in the catalog
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    /// Client could not be configured (bad base URL, TLS backend, ...)
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Coarse classification reported to tool callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NetworkError,
    UpstreamHttpError,
    DecodeError,
    InvalidArgument,
    UnknownTool,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NetworkError => "NetworkError",
            Self::UpstreamHttpError => "UpstreamHTTPError",
            Self::DecodeError => "DecodeError",
            Self::InvalidArgument => "InvalidArgument",
            Self::UnknownTool => "UnknownTool",
            Self::Internal => "InternalError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl GatewayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Network(_) | Self::Timeout(_) => ErrorKind::NetworkError,
            Self::UpstreamHttp { .. } => ErrorKind::UpstreamHttpError,
            Self::Decode(_) => ErrorKind::DecodeError,
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::UnknownTool(_) => ErrorKind::UnknownTool,
            Self::Config(_) | Self::Io(_) | Self::Json(_) => ErrorKind::Internal,
        }
    }

    /// HTTP status for upstream failures
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::UpstreamHttp { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, GatewayError>;
