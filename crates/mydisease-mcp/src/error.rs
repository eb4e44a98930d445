//! Error types for the MyDisease MCP server.
//!
//! Uses `thiserror` for structured error handling with automatic `From` implementations.

use std::time::Duration;

/// Errors from the HTTP client layer.
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    /// HTTP transport error (connection, DNS, TLS, body decoding, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Request timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Resource not found (404 response)
    #[error("Resource not found: {resource}")]
    NotFound {
        /// Description of the missing resource
        resource: String,
    },

    /// Caller error (4xx other than 404)
    #[error("Bad request ({status}): {message}")]
    BadRequest {
        /// HTTP status code
        status: u16,
        /// Error message from API
        message: String,
    },

    /// JSON parsing error
    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Server error (5xx response)
    #[error("Server error ({status}): {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
    },

    /// Unexpected HTTP status
    #[error("Unexpected status {status}: {message}")]
    UnexpectedStatus {
        /// HTTP status code
        status: u16,
        /// Response body or message
        message: String,
    },
}

impl ClientError {
    /// Create a not found error.
    #[must_use]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound { resource: resource.into() }
    }

    /// Create a bad request error.
    #[must_use]
    pub fn bad_request(status: u16, message: impl Into<String>) -> Self {
        Self::BadRequest { status, message: message.into() }
    }

    /// Create a server error.
    #[must_use]
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server { status, message: message.into() }
    }

    /// Returns true if this error is transient (timeout or 5xx).
    ///
    /// 4xx responses and malformed bodies are never retryable.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout(_) | Self::Server { .. } => true,
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    /// Short machine-readable tag for the failure class.
    #[must_use]
    pub fn kind(&self) -> TransportErrorKind {
        match self {
            Self::Timeout(_) => TransportErrorKind::Timeout,
            Self::Http(e) if e.is_timeout() => TransportErrorKind::Timeout,
            Self::Http(e) if e.is_connect() => TransportErrorKind::Connect,
            Self::Http(e) if e.is_decode() => TransportErrorKind::MalformedBody,
            Self::Http(_) => TransportErrorKind::Network,
            Self::Parse(_) => TransportErrorKind::MalformedBody,
            Self::Server { .. } => TransportErrorKind::Server,
            Self::NotFound { .. } | Self::BadRequest { .. } => TransportErrorKind::Rejected,
            Self::UnexpectedStatus { .. } => TransportErrorKind::UnexpectedStatus,
        }
    }
}

/// Failure class recorded on every identifier of a failed chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportErrorKind {
    /// The request did not complete within the request timeout.
    Timeout,
    /// The connection could not be established.
    Connect,
    /// Other network failure.
    Network,
    /// Upstream answered 5xx.
    Server,
    /// Upstream rejected the request (4xx).
    Rejected,
    /// Upstream answered with a body that is not the expected JSON shape.
    MalformedBody,
    /// Upstream answered with a status outside the handled classes.
    UnexpectedStatus,
}

impl TransportErrorKind {
    /// Tag as rendered in tool output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Connect => "connect",
            Self::Network => "network",
            Self::Server => "server",
            Self::Rejected => "rejected",
            Self::MalformedBody => "malformed_body",
            Self::UnexpectedStatus => "unexpected_status",
        }
    }
}

impl std::fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from MCP tool execution.
#[derive(thiserror::Error, Debug)]
pub enum ToolError {
    /// Caller-fixable input problem, raised before any network call.
    #[error("Invalid argument '{field}': {message}")]
    InvalidArgument {
        /// Argument that failed validation
        field: String,
        /// Validation error message, naming the offending value
        message: String,
    },

    /// Whole-invocation deadline exceeded; no partial result is returned.
    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    /// Error from the API client
    #[error("API error: {0}")]
    Client(#[from] ClientError),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal tool logic error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ToolError {
    /// Create an invalid argument error.
    #[must_use]
    pub fn invalid_argument(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument { field: field.into(), message: message.into() }
    }

    /// Create an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Convert to a user-friendly error message for MCP response.
    #[must_use]
    pub fn to_user_message(&self) -> String {
        match self {
            Self::InvalidArgument { field, message } => {
                format!("InvalidArgument: '{field}': {message}")
            }
            Self::Timeout(after) => {
                format!("Timeout: the request did not finish within {after:?}. No partial results were kept.")
            }
            Self::Client(ClientError::NotFound { resource }) => {
                format!("Not found: {resource}. Please check the ID is correct.")
            }
            Self::Serialization(e) => format!("InvalidArgument: {e}"),
            _ => self.to_string(),
        }
    }
}

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Result type alias for tool operations.
pub type ToolResult<T> = Result<T, ToolError>;
