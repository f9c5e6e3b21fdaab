//! Error types for the gateway client.

use thiserror::Error;

/// Result type for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;

/// Gateway client errors.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Configuration error (missing base URL, invalid settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport error: the request never reached the server or never
    /// returned.
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx response. `message` is the server-provided `error`/`message`
    /// field when present, otherwise `HTTP <status>`.
    #[error("{message}")]
    Request { status: u16, message: String },

    /// The response body was not the JSON we expected.
    #[error("Decode error: {0}")]
    Decode(String),
}

impl GatewayError {
    /// Human-readable message for presentation. Application errors carry
    /// the server's wording verbatim.
    pub fn message(&self) -> String {
        match self {
            GatewayError::Request { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}
