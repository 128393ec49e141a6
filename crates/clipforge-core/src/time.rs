//! Time representation for the editor.
//!
//! Timeline positions and trim points are plain `f64` seconds. Frame rates
//! stay rational so probed values like 30000/1001 survive unchanged.

use serde::{Deserialize, Serialize};

/// Frame rate as a rational number (e.g., 24000/1001 for 23.976 fps).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameRate {
    /// Numerator (e.g., 24000)
    pub numerator: u32,
    /// Denominator (e.g., 1001)
    pub denominator: u32,
}

impl FrameRate {
    /// Create a new frame rate.
    #[inline]
    pub const fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Parse an ffprobe-style rate such as `"30000/1001"` or `"25"`.
    ///
    /// Returns `None` for malformed input or a zero denominator.
    pub fn parse(rate: &str) -> Option<Self> {
        let rate = rate.trim();
        let (num, den) = match rate.split_once('/') {
            Some((n, d)) => (n.trim().parse().ok()?, d.trim().parse().ok()?),
            None => (rate.parse().ok()?, 1),
        };
        if den == 0 {
            return None;
        }
        Some(Self::new(num, den))
    }

    /// Convert to frames per second as f64.
    #[inline]
    pub fn to_fps_f64(self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }

}

/// A span of seconds on the timeline, `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TimeSpan {
    pub start: f64,
    pub end: f64,
}

impl TimeSpan {
    /// Create a span from start and end.
    #[inline]
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Closed-interval containment: both edges count as inside.
    #[inline]
    pub fn contains(self, time: f64) -> bool {
        time >= self.start && time <= self.end
    }
}

/// Format seconds as `m:ss`, the way the media library lists durations.
pub fn format_clock(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}

/// Format seconds with two decimals, as shown next to the transport.
pub fn format_seconds(seconds: f64) -> String {
    format!("{:.2}s", seconds)
}
