//! ClipForge Media - FFmpeg integration for import and export
//!
//! This crate handles:
//! - Media file inspection through ffprobe
//! - Rendering an export cut list through ffmpeg

pub mod error;
pub mod export;
pub mod probe;

pub use error::{MediaError, Result};
pub use export::{Encoder, ExportCancel, ExportProgress, ExportStage, FfmpegEncoder};
pub use probe::{FfprobeInspector, MediaInspector, ProbeReport};

/// Whether the ffmpeg and ffprobe binaries can be found.
pub fn tools_available() -> bool {
    let ffmpeg = ffmpeg_sidecar::command::ffmpeg_is_installed();
    let ffprobe = ffmpeg_sidecar::ffprobe::ffprobe_is_installed();
    if !(ffmpeg && ffprobe) {
        tracing::warn!(ffmpeg, ffprobe, "FFmpeg tools missing from PATH");
    }
    ffmpeg && ffprobe
}
