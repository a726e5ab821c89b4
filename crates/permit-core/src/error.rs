//! Error types for the `Permit` core library.

use thiserror::Error;

/// Result type alias using `Permit` Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types.
///
/// The request path itself has no error channel; these cover the ambient
/// layer around it.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Tracing subscriber could not be installed
    #[error("Tracing setup error: {0}")]
    Tracing(String),
}
