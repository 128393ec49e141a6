//! Errors from the import and encode collaborators.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MediaError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Probe failed for {}: {reason}", .path.display())]
    Probe { path: PathBuf, reason: String },

    #[error("Encoder error: {0}")]
    Encoder(String),

    #[error("Export cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MediaError>;
