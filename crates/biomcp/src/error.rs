//! Error types for the BioMCP server.
//!
//! Request failures are ordinary values: every upstream call resolves to
//! `Result<T, RequestError>` and the caller decides how to render the error.
//! `ToolError` is reserved for invalid tool input and serialization failures.

/// Status code used for transport-level failures (timeout, refused, TLS, bad URL).
pub const TRANSPORT_ERROR_STATUS: u16 = 599;

/// Status code used when a response body cannot be parsed.
pub const PARSE_ERROR_STATUS: u16 = 500;

/// Status code used for unsupported HTTP methods.
pub const UNSUPPORTED_METHOD_STATUS: u16 = 405;

/// Errors from the cached HTTP request engine.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// The request never produced an HTTP response.
    #[error("Error 599: {0}")]
    Transport(String),

    /// The upstream answered with a non-200 status.
    #[error("Error {status}: {body}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// A 200 body did not match the expected shape.
    #[error("Error 500: parse failure: {0}")]
    Parse(String),

    /// Only GET and POST are supported.
    #[error("Error 405: Unsupported method {0}")]
    UnsupportedMethod(String),
}

impl RequestError {
    /// Build an error from a non-200 raw response.
    #[must_use]
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        if status == TRANSPORT_ERROR_STATUS {
            Self::Transport(body)
        } else {
            Self::Http { status, body }
        }
    }

    /// Create a parse failure from any displayable cause.
    #[must_use]
    pub fn parse(cause: impl std::fmt::Display) -> Self {
        Self::Parse(cause.to_string())
    }

    /// Numeric code of the error.
    #[must_use]
    pub const fn code(&self) -> u16 {
        match self {
            Self::Transport(_) => TRANSPORT_ERROR_STATUS,
            Self::Http { status, .. } => *status,
            Self::Parse(_) => PARSE_ERROR_STATUS,
            Self::UnsupportedMethod(_) => UNSUPPORTED_METHOD_STATUS,
        }
    }

    /// Human-readable message without the code prefix.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Transport(msg) => msg.clone(),
            Self::Http { body, .. } => body.clone(),
            Self::Parse(details) => format!("parse failure: {details}"),
            Self::UnsupportedMethod(method) => format!("Unsupported method {method}"),
        }
    }
}

/// Errors from a cache backend. Never surfaced to callers of the engine.
#[derive(thiserror::Error, Debug)]
pub enum CacheError {
    /// Filesystem failure
    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored entry could not be decoded
    #[error("corrupt cache entry: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Errors from MCP tool execution.
#[derive(thiserror::Error, Debug)]
pub enum ToolError {
    /// Input validation failed
    #[error("Validation error: {message}")]
    Validation {
        /// Field that failed validation
        field: String,
        /// Validation error message
        message: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ToolError {
    /// Create a validation error.
    #[must_use]
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Convert to a user-friendly error message for MCP response.
    #[must_use]
    pub fn to_user_message(&self) -> String {
        match self {
            Self::Validation { field, message } => {
                format!("Invalid input for '{field}': {message}")
            }
            Self::Serialization(e) => format!("Invalid arguments: {e}"),
        }
    }
}

/// Result type alias for engine operations.
pub type RequestResult<T> = Result<T, RequestError>;

/// Result type alias for cache backends.
pub type CacheResult<T> = Result<T, CacheError>;

/// Result type alias for tool operations.
pub type ToolResult<T> = Result<T, ToolError>;
