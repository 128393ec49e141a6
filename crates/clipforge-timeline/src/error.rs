//! Error types for timeline, trim and export operations.

use clipforge_core::{ClipId, MediaId};
use thiserror::Error;

use crate::export::SkippedClip;

/// Errors from `TimelineModel` operations. A failed operation never
/// changes the model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TimelineError {
    #[error("Clip not found: {0}")]
    ClipNotFound(ClipId),

    #[error("Media not found: {0}")]
    MediaNotFound(MediaId),

    #[error("Media {media} is {duration:.3}s, shorter than the {min:.3}s minimum clip")]
    MediaTooShort {
        media: MediaId,
        duration: f64,
        min: f64,
    },

    #[error("Duplicate clip id: {0}")]
    DuplicateClip(ClipId),
}

/// Errors from the trim confirm/cancel protocol.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrimError {
    #[error("A trim gesture is already in progress on clip {0}")]
    GestureInProgress(ClipId),

    #[error("Cannot {action} while {phase}")]
    InvalidState {
        action: &'static str,
        phase: &'static str,
    },

    #[error(transparent)]
    Timeline(#[from] TimelineError),
}

/// Errors from building an export request.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExportError {
    #[error("No clips to export")]
    EmptyTimeline,

    #[error("No exportable clips: all {} clip(s) reference missing media", .skipped.len())]
    NoExportableClips { skipped: Vec<SkippedClip> },
}
