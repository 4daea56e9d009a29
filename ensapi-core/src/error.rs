//! Error types for the ENS identity API.
//!
//! Every upstream call returns one of these. The resolution layer degrades
//! them to absent fields; they only reach the caller through logs.

use thiserror::Error;

/// Result type alias using `EnsApiError`.
pub type Result<T> = std::result::Result<T, EnsApiError>;

/// Main error type for all upstream and validation failures.
#[derive(Debug, Error)]
pub enum EnsApiError {
    // ═══════════════════════════════════════════════════════════════════════════
    // NETWORK ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// JSON-RPC call returned an error object.
    #[error("RPC call failed: {0}")]
    RpcError(String),

    /// Upstream call exceeded its time budget.
    #[error("{operation} timed out after {millis}ms")]
    Timeout {
        /// Field or call that timed out
        operation: String,
        /// Budget that was exceeded
        millis: u64,
    },

    // ═══════════════════════════════════════════════════════════════════════════
    // DECODING ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// ABI return data could not be decoded.
    #[error("ABI decode error: {0}")]
    AbiDecodeError(String),

    /// Content hash record is malformed or uses an unknown codec.
    #[error("Invalid content hash: {0}")]
    InvalidContentHash(String),

    /// Upstream response lacks the expected shape.
    #[error("Unexpected response format: {0}")]
    UnexpectedResponse(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Invalid hex encoding.
    #[error("Invalid hex encoding: {0}")]
    HexError(#[from] hex::FromHexError),

    // ═══════════════════════════════════════════════════════════════════════════
    // VALIDATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Network selector is not one we serve.
    #[error("Unsupported network: {0}")]
    UnsupportedNetwork(String),

    /// Input validation failed.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl EnsApiError {
    /// Returns true if this error is transient (a later call may succeed).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            EnsApiError::HttpError(_) | EnsApiError::RpcError(_) | EnsApiError::Timeout { .. }
        )
    }

    /// Returns true if the upstream answered with data we could not interpret.
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            EnsApiError::AbiDecodeError(_)
                | EnsApiError::InvalidContentHash(_)
                | EnsApiError::UnexpectedResponse(_)
                | EnsApiError::JsonError(_)
                | EnsApiError::HexError(_)
        )
    }
}
