//! Shared error type across voxrelay crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Invalid input / malformed request or frame.
    BadRequest,
    /// Unsupported config version.
    UnsupportedVersion,
    /// A registered handler failed.
    HandlerFailed,
    /// Internal broker error.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ClientCode::HandlerFailed => "HANDLER_FAILED",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, RelayError>;

/// Unified error type used by core and broker.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("handler failed: {0}")]
    HandlerFailed(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl RelayError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            RelayError::BadRequest(_) => ClientCode::BadRequest,
            RelayError::UnsupportedVersion => ClientCode::UnsupportedVersion,
            RelayError::HandlerFailed(_) => ClientCode::HandlerFailed,
            RelayError::Internal(_) => ClientCode::Internal,
        }
    }
}
