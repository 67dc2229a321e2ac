//! Client error types

use shared::ModelError;
use thiserror::Error;

use crate::mutation::ValidationErrors;

/// Fallback shown when the server rejects a request without a readable body
pub const GENERIC_SERVER_ERROR: &str = "The server rejected the request";

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// Client-side validation failed; no request was sent
    #[error("Validation error: {0}")]
    Validation(ValidationErrors),

    /// Transport failure, no usable response received
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with an error status; message is the body's
    /// `error`/`message` field or [`GENERIC_SERVER_ERROR`]
    #[error("{message}")]
    Api { status: u16, message: String },

    /// HTTP 401; the session has already been invalidated
    #[error("Authentication required: {0}")]
    Unauthorized(String),

    /// Invalid response format
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Query input rejected by the resource schema
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// A submit for this form is already in flight
    #[error("A request for this action is already in flight")]
    Busy,

    /// The owning controller was closed
    #[error("Request cancelled")]
    Cancelled,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Model(#[from] ModelError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Action an error is reported against, selects the generic fallback text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorContext {
    Fetch,
    Save,
    Login,
}

impl ErrorContext {
    fn fallback(self) -> &'static str {
        match self {
            ErrorContext::Fetch => "Failed to fetch data",
            ErrorContext::Save => "Failed to save data",
            ErrorContext::Login => "Login failed",
        }
    }
}

impl ClientError {
    /// Text for the error banner of the triggering screen
    pub fn user_message(&self, ctx: ErrorContext) -> String {
        match self {
            ClientError::Validation(errors) => errors.to_string(),
            ClientError::Api { message, .. } => message.clone(),
            ClientError::Unauthorized(message) if ctx == ErrorContext::Login => message.clone(),
            ClientError::Unauthorized(_) => "Session expired, please log in again".to_string(),
            ClientError::InvalidQuery(message) => message.clone(),
            ClientError::Busy => "Please wait for the current request to finish".to_string(),
            _ => ctx.fallback().to_string(),
        }
    }

    /// Whether the error carries an HTTP status from the server
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Unauthorized(_) => Some(401),
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_message_is_verbatim() {
        let err = ClientError::Api {
            status: 422,
            message: "Email already registered".into(),
        };
        assert_eq!(err.user_message(ErrorContext::Save), "Email already registered");
        assert_eq!(err.status(), Some(422));
    }

    #[test]
    fn test_transport_errors_use_fallback() {
        let err = ClientError::InvalidResponse("truncated".into());
        assert_eq!(err.user_message(ErrorContext::Fetch), "Failed to fetch data");
        assert_eq!(err.user_message(ErrorContext::Save), "Failed to save data");
    }

    #[test]
    fn test_unauthorized_message_depends_on_context() {
        let err = ClientError::Unauthorized("Invalid email or password".into());
        assert_eq!(err.user_message(ErrorContext::Login), "Invalid email or password");
        assert_eq!(
            err.user_message(ErrorContext::Fetch),
            "Session expired, please log in again"
        );
    }
}
