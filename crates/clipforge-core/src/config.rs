//! Editor configuration with versioning.
//!
//! Stored as JSON with a schema version field. Missing fields fall back to
//! defaults, so older files keep loading as new settings are added.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ClipForgeError, Result};
use crate::DEFAULT_MIN_CLIP_DURATION;

/// Current config schema version.
pub const CONFIG_VERSION: u32 = 1;

/// Environment variable that overrides the config file location.
pub const CONFIG_ENV: &str = "CLIPFORGE_CONFIG";

/// Order in which clips are emitted into the export cut list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CutOrder {
    /// Sorted by timeline start time (stable for equal starts).
    #[default]
    Position,
    /// The order clips were inserted into the timeline.
    Sequence,
}

/// Timeline canvas and editing settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineSettings {
    /// Pixels per second at zoom 1.0.
    pub base_pixels_per_second: f32,
    pub min_zoom: f32,
    pub max_zoom: f32,
    pub default_zoom: f32,
    /// Y offset of the clip lane below the ruler.
    pub track_top: f32,
    pub track_height: f32,
    /// Width of the grab zone at each clip edge.
    pub handle_width: f32,
    /// The canvas is never drawn shorter than this many seconds.
    pub min_display_duration: f64,
}

impl Default for TimelineSettings {
    fn default() -> Self {
        Self {
            base_pixels_per_second: 50.0,
            min_zoom: 0.1,
            max_zoom: 5.0,
            default_zoom: 1.0,
            track_top: 50.0,
            track_height: 60.0,
            handle_width: 6.0,
            min_display_duration: 30.0 * 60.0,
        }
    }
}

/// Settings handed to the encoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    pub cut_order: CutOrder,
    /// FFmpeg video encoder name.
    pub video_codec: String,
    /// Encoder speed preset.
    pub preset: String,
    /// Constant rate factor (0-51, lower = better).
    pub crf: u32,
    /// FFmpeg audio encoder name.
    pub audio_codec: String,
    /// Extension forced onto export paths.
    pub extension: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            cut_order: CutOrder::Position,
            video_codec: "libx264".into(),
            preset: "fast".into(),
            crf: 23,
            audio_codec: "aac".into(),
            extension: "mp4".into(),
        }
    }
}

/// Top-level editor configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Schema version for migration.
    pub version: u32,
    /// Minimum `out - in` a clip may be trimmed to, in seconds.
    pub min_clip_duration: f64,
    pub timeline: TimelineSettings,
    pub export: ExportSettings,
    /// Default tracing filter when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            min_clip_duration: DEFAULT_MIN_CLIP_DURATION,
            timeline: TimelineSettings::default(),
            export: ExportSettings::default(),
            log_level: "info".into(),
        }
    }
}

impl EditorConfig {
    /// Serialize to pretty JSON bytes.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(self)
            .map_err(|e| ClipForgeError::Serialization(format!("Failed to serialize config: {}", e)))
    }

    /// Deserialize from JSON bytes, applying migrations and validation.
    pub fn from_json(data: &[u8]) -> Result<Self> {
        let raw: serde_json::Value = serde_json::from_slice(data)
            .map_err(|e| ClipForgeError::Serialization(format!("Invalid JSON: {}", e)))?;

        let version = raw.get("version").and_then(|v| v.as_u64()).unwrap_or(0) as u32;
        if version > CONFIG_VERSION {
            return Err(ClipForgeError::Config(format!(
                "Config version {} is newer than supported version {}",
                version, CONFIG_VERSION
            )));
        }

        let migrated = migrate(raw, version)?;
        let config: Self = serde_json::from_value(migrated)
            .map_err(|e| ClipForgeError::Serialization(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_json(&data)
    }

    /// Load from a file path, using defaults when the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Save to a file path, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Config location: `$CLIPFORGE_CONFIG`, else `<config dir>/clipforge/config.json`.
    pub fn resolve_path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }
        dirs::config_dir().map(|dir| dir.join("clipforge").join("config.json"))
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if !(self.min_clip_duration.is_finite() && self.min_clip_duration > 0.0) {
            return Err(ClipForgeError::InvalidParameter(format!(
                "min_clip_duration must be positive, got {}",
                self.min_clip_duration
            )));
        }
        let t = &self.timeline;
        if !(t.min_zoom > 0.0 && t.min_zoom <= t.max_zoom) {
            return Err(ClipForgeError::InvalidParameter(format!(
                "zoom range {}..{} is invalid",
                t.min_zoom, t.max_zoom
            )));
        }
        if t.base_pixels_per_second <= 0.0 {
            return Err(ClipForgeError::InvalidParameter(
                "base_pixels_per_second must be positive".into(),
            ));
        }
        if self.export.crf > 51 {
            return Err(ClipForgeError::InvalidParameter(format!(
                "crf must be 0-51, got {}",
                self.export.crf
            )));
        }
        Ok(())
    }

    /// Clamp a requested zoom level into the configured range.
    pub fn clamp_zoom(&self, zoom: f32) -> f32 {
        if zoom.is_nan() {
            return self.timeline.default_zoom;
        }
        zoom.clamp(self.timeline.min_zoom, self.timeline.max_zoom)
    }
}

/// Apply sequential migrations from `from_version` to CONFIG_VERSION.
fn migrate(mut data: serde_json::Value, from_version: u32) -> Result<serde_json::Value> {
    let mut version = from_version;

    while version < CONFIG_VERSION {
        match version {
            0 => {
                // v0 files predate the version field
                if let Some(obj) = data.as_object_mut() {
                    obj.insert("version".into(), serde_json::json!(1));
                }
                version = 1;
            }
            _ => {
                return Err(ClipForgeError::Config(format!(
                    "No migration path from version {}",
                    version
                )));
            }
        }
    }

    Ok(data)
}
