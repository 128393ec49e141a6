//! Playback error types.

use std::path::PathBuf;

use clipforge_timeline::TimelineError;
use thiserror::Error;

/// Failures reported by a playback engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Failed to load {path}: {reason}")]
    Load { path: PathBuf, reason: String },

    #[error("Seek to {target:.3}s failed: {reason}")]
    Seek { target: f64, reason: String },

    #[error("Playback failed: {0}")]
    Playback(String),
}

/// Errors from cursor operations. None of them move the playhead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlaybackError {
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Timeline(#[from] TimelineError),
}

pub type Result<T> = std::result::Result<T, PlaybackError>;
