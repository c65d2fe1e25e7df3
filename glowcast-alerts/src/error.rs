//! Error types for glowcast-alerts
//!
//! Module-specific error types using thiserror. Nothing in the dispatch
//! pipeline propagates fatally to event producers; these errors surface
//! only through operator-initiated calls and logs.

use thiserror::Error;

/// Main error type for the alert dispatcher
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file loading errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database connection or query errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// HTTP server errors
    #[error("HTTP server error: {0}")]
    Http(String),

    /// Template formatting errors
    #[error("Format error: {0}")]
    Format(String),

    /// Alert construction errors
    #[error("Builder error: {0}")]
    Builder(String),

    /// Sink publish errors
    #[error("Sink error: {0}")]
    Sink(String),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Other errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<glowcast_common::Error> for Error {
    fn from(e: glowcast_common::Error) -> Self {
        match e {
            glowcast_common::Error::Format(m) => Error::Format(m),
            glowcast_common::Error::NotFound(m) => Error::NotFound(m),
            glowcast_common::Error::InvalidInput(m) => Error::BadRequest(m),
            other => Error::Internal(other.to_string()),
        }
    }
}

/// Convenience Result type using glowcast-alerts Error
pub type Result<T> = std::result::Result<T, Error>;
