//! Common error types for moodcheck

use thiserror::Error;

/// Common result type for moodcheck operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across moodcheck services
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Remote store operation failed (upload, append, query)
    #[error("Store error: {0}")]
    Store(String),

    /// Sign-in failed. All causes (bad credentials, network, disabled
    /// account) collapse into this one variant; callers must not leak
    /// which part of the credential pair was wrong.
    #[error("Authentication failed")]
    Auth,

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Canvas flattening or JPEG encoding error
    #[error("Image error: {0}")]
    Image(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
