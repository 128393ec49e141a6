//! ClipForge Playback - Timeline playback
//!
//! A [`PlaybackCursor`] turns the timeline's single playhead into "which
//! clip, which source time" and steers a [`PlaybackEngine`] across clip
//! boundaries. The host drives it by calling `tick` once per frame.

pub mod cursor;
pub mod engine;
pub mod error;

pub use cursor::{resolve, PlaybackCursor, Resolution, TickOutcome};
pub use engine::{EngineCall, PlaybackEngine, SimulatedEngine};
pub use error::{EngineError, PlaybackError};
