//! Decoding errors for wire payloads

use thiserror::Error;

/// Error raised while interpreting a backend payload
#[derive(Debug, Error)]
pub enum ModelError {
    /// None of the known row-array keys were present
    #[error("list response has no row array (tried: {tried})")]
    MissingRows { tried: String },

    /// The payload was expected to be a JSON object
    #[error("expected a JSON object, got {0}")]
    NotAnObject(&'static str),

    /// Status flag outside of `0`/`1`
    #[error("invalid status flag: {0}")]
    InvalidStatus(String),

    /// Order status not in the known set
    #[error("unknown order status: {0}")]
    UnknownOrderStatus(String),

    /// Row failed to decode into the typed record
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Result type for model operations
pub type ModelResult<T> = Result<T, ModelError>;
