//! Error types for the artifacts MCP server with MCP error code mapping

use thiserror::Error;

/// Errors that can occur in the MCP server
#[derive(Debug, Error)]
pub enum McpError {
    /// No live page has this id
    #[error("Page not found: {0}")]
    PageNotFound(String),

    /// A resource URL did not parse as an absolute URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Invalid parameter provided
    #[error("{0}")]
    InvalidParams(String),

    /// JSON serialization/deserialization error
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Protocol error
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Internal server error
    #[error("internal error: {0}")]
    Internal(String),
}

impl McpError {
    /// Map error to MCP error code
    pub const fn error_code(&self) -> i32 {
        match self {
            Self::Internal(_) => -32603, // Internal error
            Self::Json(_) => -32700,     // Parse error
            Self::Protocol(_) => -32600, // Invalid request
            Self::PageNotFound(_) | Self::InvalidUrl(_) | Self::InvalidParams(_) => {
                -32602 // Invalid params
            },
        }
    }

    /// Whether this is reported to the client as an error-flagged tool result
    /// rather than a protocol-level error.
    pub const fn is_tool_error(&self) -> bool {
        matches!(
            self,
            Self::PageNotFound(_) | Self::InvalidUrl(_) | Self::InvalidParams(_)
        )
    }
}

impl From<McpError> for rmcp::ErrorData {
    fn from(err: McpError) -> Self {
        let message = err.to_string();
        match err.error_code() {
            -32700 => Self::parse_error(message, None),
            -32600 => Self::invalid_request(message, None),
            -32602 => Self::invalid_params(message, None),
            _ => Self::internal_error(message, None),
        }
    }
}

/// Result type alias for MCP operations
pub type McpResult<T> = Result<T, McpError>;
