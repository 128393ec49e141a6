//! ClipForge Core - Foundation types for the editor
//!
//! This crate provides the fundamental types used throughout ClipForge:
//! - Error taxonomy shared by every crate
//! - Editor configuration (JSON, versioned)
//! - Opaque clip and media identifiers
//! - Seconds-based time helpers and frame rates
//! - Geometric primitives for hit testing

pub mod config;
pub mod error;
pub mod geometry;
pub mod id;
pub mod time;

pub use config::{CutOrder, EditorConfig, ExportSettings, TimelineSettings};
pub use error::{ClipForgeError, Result};
pub use geometry::{Rect, Vec2};
pub use id::{ClipId, MediaId};
pub use time::{FrameRate, TimeSpan};

/// Smallest trim window a clip may have, in seconds.
pub const DEFAULT_MIN_CLIP_DURATION: f64 = 0.1;
