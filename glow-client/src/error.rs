//! Error types for the Glow client

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when using the Glow client
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure: connect error, timeout, connection reset
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// API returned a non-success status code
    #[error(
        "API error (status {status}): {}",
        .message.as_deref().unwrap_or("no message")
    )]
    ApiError {
        /// HTTP status code
        status: u16,
        /// `message` field of the error body, when the server sent one
        message: Option<String>,
    },

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// No bearer token is available locally
    #[error("Authorization required")]
    AuthRequired,

    /// Request rejected before it was sent
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Client configuration is unusable
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ClientError {
    /// Create an API error from status code and optional server message
    pub fn api_error(status: u16, message: Option<String>) -> Self {
        Self::ApiError { status, message }
    }

    /// HTTP status carried by this error, if the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ApiError { status, .. } => Some(*status),
            Self::RequestFailed(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Check if this error is a "not found" error
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Check if this error is a client error (4xx status)
    pub fn is_client_error(&self) -> bool {
        matches!(self.status(), Some(status) if (400..500).contains(&status))
    }

    /// Check if this error is a server error (5xx status)
    pub fn is_server_error(&self) -> bool {
        matches!(self.status(), Some(status) if status >= 500)
    }

    /// Errors that retrying the same request cannot fix
    pub fn is_permanent(&self) -> bool {
        match self {
            Self::AuthRequired | Self::Validation(_) | Self::InvalidConfig(_) => true,
            _ => self.is_client_error(),
        }
    }

    /// Server-supplied message, if any
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::ApiError { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}
