//! Unified error types for fleet telemetry.
//!
//! Error codes:
//! - CONFIG_001: Store configuration missing or invalid
//! - STORE_001-002: Remote store transport and decoding errors
//! - VALID_001-003: Validation errors

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Validation error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorCode {
    /// VALID_001: Invalid JSON / invalid shape
    InvalidFormat,
    /// VALID_002: Required field missing or empty
    MissingField,
    /// VALID_003: Identifier contains reserved characters or is too long
    InvalidIdentifier,
}

impl ValidationErrorCode {
    /// Get the error code string.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidFormat => "VALID_001",
            Self::MissingField => "VALID_002",
            Self::InvalidIdentifier => "VALID_003",
        }
    }
}

/// Remote store error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorCode {
    /// STORE_001: Network failure or non-success status from the store
    Transport,
    /// STORE_002: Stored value could not be decoded
    Parse,
}

impl StoreErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Transport => "STORE_001",
            Self::Parse => "STORE_002",
        }
    }
}

/// Unified error type for fleet telemetry.
#[derive(Debug, Error)]
pub enum Error {
    /// Required store configuration is missing or invalid.
    #[error("[CONFIG_001] {0}")]
    Configuration(String),

    /// Network failure or non-success HTTP status from the remote store.
    #[error("[STORE_001] {message}")]
    Transport {
        message: String,
        /// HTTP status returned by the store, if a response arrived.
        status: Option<u16>,
    },

    /// A stored value could not be decoded into the expected shape.
    #[error("[STORE_002] {0}")]
    Parse(String),

    /// Validation error with code.
    #[error("[{code}] {message}")]
    ValidationWithCode {
        code: &'static str,
        message: String,
        details: Vec<String>,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Transport failure without a response (connect, timeout, body read).
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport {
            message: msg.into(),
            status: None,
        }
    }

    /// Non-success HTTP status from the store.
    pub fn transport_status(status: u16, msg: impl Into<String>) -> Self {
        Self::Transport {
            message: msg.into(),
            status: Some(status),
        }
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a validation error with code and per-field details.
    pub fn validation_code(
        code: ValidationErrorCode,
        msg: impl Into<String>,
        details: Vec<String>,
    ) -> Self {
        Self::ValidationWithCode {
            code: code.code(),
            message: msg.into(),
            details,
        }
    }

    /// Get the HTTP status code for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Configuration(_) => 500,
            Self::Transport { .. } => 502,
            Self::Parse(_) => 502,
            Self::ValidationWithCode { .. } => 400,
            Self::Serialization(_) => 400,
        }
    }

    /// Get the error code if this is a coded error.
    pub fn error_code(&self) -> Option<&'static str> {
        match self {
            Self::Configuration(_) => Some("CONFIG_001"),
            Self::Transport { .. } => Some(StoreErrorCode::Transport.code()),
            Self::Parse(_) => Some(StoreErrorCode::Parse.code()),
            Self::ValidationWithCode { code, .. } => Some(code),
            _ => None,
        }
    }
}
