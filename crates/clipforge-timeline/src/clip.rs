//! Clip types for the timeline.

use clipforge_core::{ClipId, MediaId, TimeSpan};
use serde::{Deserialize, Serialize};

/// Which edge of a clip a trim acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrimEdge {
    /// Moves the in point.
    Left,
    /// Moves the out point.
    Right,
}

impl TrimEdge {
    /// Where on the clip the trim happens, for confirmation text.
    pub fn label(self) -> &'static str {
        match self {
            TrimEdge::Left => "beginning",
            TrimEdge::Right => "end",
        }
    }
}

/// A trimmed reference to a media asset placed on the timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineClip {
    /// Unique clip ID
    pub id: ClipId,
    /// Referenced media asset (may dangle after library removal)
    pub media_id: MediaId,
    /// Position on the global timeline, seconds
    pub start_time_sec: f64,
    /// Source in point, seconds
    pub in_sec: f64,
    /// Source out point, seconds
    pub out_sec: f64,
    /// Track the clip was placed on
    pub track: u32,
}

impl TimelineClip {
    /// Create a clip playing `[in_sec, out_sec)` of `media_id` at `start_time_sec`.
    pub fn new(media_id: MediaId, start_time_sec: f64, in_sec: f64, out_sec: f64) -> Self {
        Self {
            id: ClipId::new(),
            media_id,
            start_time_sec,
            in_sec,
            out_sec,
            track: 0,
        }
    }

    /// Effective duration: `out - in`.
    #[inline]
    pub fn duration(&self) -> f64 {
        self.out_sec - self.in_sec
    }

    /// Effective timeline end: `start + (out - in)`.
    #[inline]
    pub fn end_time(&self) -> f64 {
        self.start_time_sec + self.duration()
    }

    /// Span occupied on the timeline.
    pub fn timeline_span(&self) -> TimeSpan {
        TimeSpan::new(self.start_time_sec, self.end_time())
    }

    /// Source time shown when the playhead is at `position`.
    #[inline]
    pub fn source_time_at(&self, position: f64) -> f64 {
        self.in_sec + (position - self.start_time_sec)
    }

    /// Timeline position of a source time inside the trim window.
    #[inline]
    pub fn timeline_time_of(&self, source_time: f64) -> f64 {
        self.start_time_sec + (source_time - self.in_sec)
    }

    /// Closed-interval test used by playhead resolution.
    #[inline]
    pub fn contains_time(&self, position: f64) -> bool {
        self.timeline_span().contains(position)
    }
}
