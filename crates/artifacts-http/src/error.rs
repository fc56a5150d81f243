//! Error types for the preview server.

use thiserror::Error;

/// Errors that can occur while starting or stopping the HTTP server.
#[derive(Debug, Error)]
pub enum HttpError {
    /// The listening socket could not be bound
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Address that was requested
        addr: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// I/O error while serving
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The server task panicked or was cancelled
    #[error("server task failed: {0}")]
    Task(String),
}

/// Result type alias for HTTP server operations
pub type HttpResult<T> = Result<T, HttpError>;
