//! Media file inspection through ffprobe.

use clipforge_core::FrameRate;
use clipforge_timeline::MediaAsset;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

use crate::error::{MediaError, Result};

/// Metadata of a probed file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeReport {
    pub path: PathBuf,
    pub duration_sec: f64,
    pub width: u32,
    pub height: u32,
    pub size_bytes: u64,
    pub codec: Option<String>,
    pub fps: Option<f64>,
}

impl ProbeReport {
    /// Build a library asset from this report.
    pub fn into_asset(self) -> MediaAsset {
        let mut asset = MediaAsset::new(
            self.path,
            self.duration_sec,
            self.width,
            self.height,
            self.size_bytes,
        );
        asset.codec = self.codec;
        asset.fps = self.fps;
        asset
    }
}

/// The import collaborator: file path in, metadata or a descriptive error out.
pub trait MediaInspector {
    fn inspect(&self, path: &Path) -> Result<ProbeReport>;
}

/// Inspector that shells out to ffprobe.
#[derive(Debug, Clone)]
pub struct FfprobeInspector {
    binary: PathBuf,
}

impl FfprobeInspector {
    /// Use the ffprobe that ffmpeg-sidecar resolves (next to the current
    /// executable, else on `PATH`).
    pub fn new() -> Self {
        Self::with_binary(ffmpeg_sidecar::ffprobe::ffprobe_path())
    }

    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for FfprobeInspector {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaInspector for FfprobeInspector {
    fn inspect(&self, path: &Path) -> Result<ProbeReport> {
        if !path.exists() {
            return Err(MediaError::NotFound(path.to_path_buf()));
        }
        let size_bytes = std::fs::metadata(path)?.len();

        debug!(path = %path.display(), binary = %self.binary.display(), "Running ffprobe");
        let output = Command::new(&self.binary)
            .args(ffprobe_args(path))
            .output()
            .map_err(|e| MediaError::Probe {
                path: path.to_path_buf(),
                reason: format!("failed to run ffprobe: {e}"),
            })?;

        if !output.status.success() {
            return Err(MediaError::Probe {
                path: path.to_path_buf(),
                reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let report = parse_ffprobe_json(path, &output.stdout, size_bytes)?;
        info!(
            path = %path.display(),
            duration = report.duration_sec,
            width = report.width,
            height = report.height,
            "Media probed"
        );
        Ok(report)
    }
}

/// Arguments asking ffprobe for the first video stream and the container
/// duration as JSON.
pub fn ffprobe_args(path: &Path) -> Vec<String> {
    vec![
        "-v".into(),
        "error".into(),
        "-select_streams".into(),
        "v:0".into(),
        "-show_entries".into(),
        "stream=width,height,r_frame_rate,codec_name:format=duration".into(),
        "-of".into(),
        "json".into(),
        path.to_string_lossy().into_owned(),
    ]
}

#[derive(Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
    format: Option<FfprobeFormat>,
}

#[derive(Deserialize)]
struct FfprobeStream {
    width: Option<u32>,
    height: Option<u32>,
    codec_name: Option<String>,
    r_frame_rate: Option<String>,
}

#[derive(Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

/// Parse ffprobe's JSON. A file without a video stream or a usable
/// duration is rejected rather than imported with made-up values.
pub fn parse_ffprobe_json(path: &Path, json: &[u8], size_bytes: u64) -> Result<ProbeReport> {
    let fail = |reason: String| MediaError::Probe {
        path: path.to_path_buf(),
        reason,
    };

    let parsed: FfprobeOutput =
        serde_json::from_slice(json).map_err(|e| fail(format!("invalid ffprobe output: {e}")))?;

    let stream = parsed
        .streams
        .into_iter()
        .next()
        .ok_or_else(|| fail("no video stream".into()))?;

    let duration_sec = parsed
        .format
        .and_then(|f| f.duration)
        .and_then(|d| d.trim().parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d > 0.0)
        .ok_or_else(|| fail("missing or invalid duration".into()))?;

    let (Some(width), Some(height)) = (stream.width, stream.height) else {
        return Err(fail("video stream has no dimensions".into()));
    };

    Ok(ProbeReport {
        path: path.to_path_buf(),
        duration_sec,
        width,
        height,
        size_bytes,
        codec: stream.codec_name,
        fps: stream
            .r_frame_rate
            .as_deref()
            .and_then(FrameRate::parse)
            .map(FrameRate::to_fps_f64),
    })
}
