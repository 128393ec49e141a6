//! Errors surfaced by the editor controller.

use clipforge_media::MediaError;
use clipforge_playback::PlaybackError;
use clipforge_timeline::{ExportError, TimelineError, TrimError};
use thiserror::Error;

/// Any failure of a controller operation. The editor state is left as it
/// was before the call.
#[derive(Error, Debug)]
pub enum EditorError {
    #[error(transparent)]
    Timeline(#[from] TimelineError),

    #[error(transparent)]
    Trim(#[from] TrimError),

    #[error(transparent)]
    Playback(#[from] PlaybackError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Media(#[from] MediaError),
}

pub type Result<T> = std::result::Result<T, EditorError>;
