//! Shared error type across pulsegate crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Invalid input / malformed request.
    BadRequest,
    /// No handler registered for the requested route.
    NotFound,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::NotFound => "NOT_FOUND",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, PulsegateError>;

/// Failure surfaced by handler logic. Instrumentation observes these
/// read-only and always passes them through unchanged.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Unified error type used by core and gateway.
#[derive(Debug, Error)]
pub enum PulsegateError {
    /// A handler carries instrumentation markers but no resolvable metric
    /// identity. Raised at registration time, never at request time.
    #[error("configuration: {0}")]
    Configuration(String),
    /// A failure inside instrumentation code. Always recovered locally.
    #[error("instrumentation: {0}")]
    Instrumentation(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("unknown route: {0}")]
    UnknownRoute(String),
    #[error("bad config: {0}")]
    BadConfig(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl PulsegateError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            PulsegateError::Configuration(_) => ClientCode::Internal,
            PulsegateError::Instrumentation(_) => ClientCode::Internal,
            PulsegateError::BadRequest(_) => ClientCode::BadRequest,
            PulsegateError::UnknownRoute(_) => ClientCode::NotFound,
            PulsegateError::BadConfig(_) => ClientCode::BadRequest,
            PulsegateError::Internal(_) => ClientCode::Internal,
        }
    }
}
