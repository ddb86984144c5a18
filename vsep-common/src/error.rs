//! Common error types for vsep

use thiserror::Error;

/// Common result type for vsep operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the vsep crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Audio could not be decoded
    #[error("Audio decode error: {0}")]
    Decode(String),

    /// Audio could not be encoded or written
    #[error("Audio encode error: {0}")]
    Encode(String),

    /// External tool failed to start or exited non-zero
    #[error("{tool} failed (exit code {code:?}): {stderr}")]
    Tool {
        tool: String,
        code: Option<i32>,
        stderr: String,
    },

    /// Separation model returned something unusable
    #[error("Model error: {0}")]
    Model(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
