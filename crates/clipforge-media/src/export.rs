//! Rendering an export cut list to a video file.
//!
//! Each cut is re-encoded into its own segment with output seeking, then
//! the segments are joined with ffmpeg's concat demuxer. A single cut is
//! rendered straight to the destination.

use clipforge_core::ExportSettings;
use clipforge_timeline::{CutEntry, ExportRequest};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{MediaError, Result};

/// What the encoder is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStage {
    Rendering,
    Concatenating,
    Done,
}

/// Export progress information.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportProgress {
    pub stage: ExportStage,
    /// Segments rendered so far.
    pub completed: usize,
    pub total: usize,
}

impl ExportProgress {
    /// Completion fraction (0.0 to 1.0).
    pub fn fraction(&self) -> f64 {
        if self.stage == ExportStage::Done {
            return 1.0;
        }
        if self.total == 0 {
            return 0.0;
        }
        // Concatenation counts as one extra step.
        self.completed as f64 / (self.total + 1) as f64
    }
}

/// Handle for cancelling an in-progress export.
#[derive(Debug, Clone)]
pub struct ExportCancel(Arc<AtomicBool>);

impl ExportCancel {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    /// Signal cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

impl Default for ExportCancel {
    fn default() -> Self {
        Self::new()
    }
}

/// The encode collaborator: ordered cuts and a destination in, final path
/// out.
pub trait Encoder {
    fn encode(
        &self,
        request: &ExportRequest,
        cancel: &ExportCancel,
        on_progress: &mut dyn FnMut(ExportProgress),
    ) -> Result<PathBuf>;
}

/// Encoder driving the ffmpeg binary.
#[derive(Debug, Clone)]
pub struct FfmpegEncoder {
    binary: PathBuf,
    settings: ExportSettings,
}

impl FfmpegEncoder {
    /// Use the ffmpeg that ffmpeg-sidecar resolves.
    pub fn new(settings: ExportSettings) -> Self {
        Self::with_binary(ffmpeg_sidecar::paths::ffmpeg_path(), settings)
    }

    pub fn with_binary(binary: impl Into<PathBuf>, settings: ExportSettings) -> Self {
        Self {
            binary: binary.into(),
            settings,
        }
    }

    /// Arguments rendering one cut to `output`.
    pub fn segment_args(&self, cut: &CutEntry, output: &Path) -> Vec<String> {
        vec![
            "-y".into(),
            "-i".into(),
            cut.source_path.to_string_lossy().into_owned(),
            "-ss".into(),
            cut.in_sec.to_string(),
            "-t".into(),
            cut.duration().to_string(),
            "-c:v".into(),
            self.settings.video_codec.clone(),
            "-preset".into(),
            self.settings.preset.clone(),
            "-crf".into(),
            self.settings.crf.to_string(),
            "-c:a".into(),
            self.settings.audio_codec.clone(),
            output.to_string_lossy().into_owned(),
        ]
    }

    /// Arguments joining the segments listed in `list` without re-encoding.
    pub fn concat_args(list: &Path, output: &Path) -> Vec<String> {
        vec![
            "-y".into(),
            "-f".into(),
            "concat".into(),
            "-safe".into(),
            "0".into(),
            "-i".into(),
            list.to_string_lossy().into_owned(),
            "-c".into(),
            "copy".into(),
            output.to_string_lossy().into_owned(),
        ]
    }

    fn run(&self, args: &[String]) -> Result<()> {
        debug!(binary = %self.binary.display(), args = %args.join(" "), "Running ffmpeg");
        let output = Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| MediaError::Encoder(format!("Failed to spawn ffmpeg: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MediaError::Encoder(format!(
                "ffmpeg exited with {}: {}",
                output.status,
                last_lines(&stderr, 5)
            )));
        }
        Ok(())
    }
}

impl Encoder for FfmpegEncoder {
    fn encode(
        &self,
        request: &ExportRequest,
        cancel: &ExportCancel,
        on_progress: &mut dyn FnMut(ExportProgress),
    ) -> Result<PathBuf> {
        let total = request.cuts.len();
        if total == 0 {
            return Err(MediaError::Encoder("No clips to export".into()));
        }
        if let Some(parent) = request.output_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        info!(cuts = total, output = %request.output_path.display(), "Export started");
        on_progress(ExportProgress {
            stage: ExportStage::Rendering,
            completed: 0,
            total,
        });

        if let [cut] = request.cuts.as_slice() {
            if cancel.is_cancelled() {
                return Err(MediaError::Cancelled);
            }
            self.run(&self.segment_args(cut, &request.output_path))?;
        } else {
            // Removed with its contents when dropped.
            let work = tempfile::Builder::new().prefix("clipforge_export").tempdir()?;
            let mut segments = Vec::with_capacity(total);

            for (i, cut) in request.cuts.iter().enumerate() {
                if cancel.is_cancelled() {
                    info!(completed = i, "Export cancelled");
                    return Err(MediaError::Cancelled);
                }
                let segment = work.path().join(format!("clip_{i}.mp4"));
                self.run(&self.segment_args(cut, &segment))?;
                segments.push(segment);
                on_progress(ExportProgress {
                    stage: ExportStage::Rendering,
                    completed: i + 1,
                    total,
                });
            }

            if cancel.is_cancelled() {
                return Err(MediaError::Cancelled);
            }
            on_progress(ExportProgress {
                stage: ExportStage::Concatenating,
                completed: total,
                total,
            });
            let list = work.path().join("concat_list.txt");
            std::fs::write(&list, concat_list(&segments))?;
            self.run(&Self::concat_args(&list, &request.output_path))?;
        }

        on_progress(ExportProgress {
            stage: ExportStage::Done,
            completed: total,
            total,
        });
        info!(output = %request.output_path.display(), "Export complete");
        Ok(request.output_path.clone())
    }
}

/// Concat demuxer input listing `files` in order.
pub fn concat_list(files: &[PathBuf]) -> String {
    files
        .iter()
        .map(|f| format!("file '{}'\n", f.to_string_lossy().replace('\'', "'\\''")))
        .collect()
}

fn last_lines(text: &str, n: usize) -> String {
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    lines[lines.len().saturating_sub(n)..].join("\n")
}
