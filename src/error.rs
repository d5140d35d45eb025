//! Common error types for MintyTag

use thiserror::Error;

/// Common result type for MintyTag operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types shared across the service
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested row or resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Metadata parse failure from the tag-reading collaborator
    #[error("Metadata parse error: {0}")]
    Parse(String),

    /// Tag serialization failure from the tag-writing collaborator
    #[error("Tag write error: {0}")]
    TagWrite(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}
