//! Error types for ClipForge.

use thiserror::Error;

/// Error type for configuration and other crate-independent failures.
#[derive(Error, Debug)]
pub enum ClipForgeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, ClipForgeError>;
