//! The timeline model: an ordered set of clips and its mutation API.
//!
//! The clip list lives behind an `Arc` and is never edited in place. Every
//! mutation builds the next list and swaps it in whole, so a reader holding
//! a [`TimelineModel::snapshot`] never sees a half-applied edit.

use std::collections::HashSet;
use std::sync::Arc;

use clipforge_core::{ClipId, MediaId, DEFAULT_MIN_CLIP_DURATION};
use tracing::{debug, info};

use crate::clip::{TimelineClip, TrimEdge};
use crate::error::TimelineError;
use crate::media::MediaCatalog;

type Result<T> = std::result::Result<T, TimelineError>;

/// Ordered collection of clips placed on the timeline.
#[derive(Debug, Clone)]
pub struct TimelineModel {
    clips: Arc<Vec<TimelineClip>>,
    selected: Option<ClipId>,
    min_clip_duration: f64,
}

impl TimelineModel {
    /// Create an empty timeline with the default minimum clip duration.
    pub fn new() -> Self {
        Self::with_min_clip_duration(DEFAULT_MIN_CLIP_DURATION)
    }

    /// Create an empty timeline with a custom minimum clip duration.
    pub fn with_min_clip_duration(min_clip_duration: f64) -> Self {
        Self {
            clips: Arc::new(Vec::new()),
            selected: None,
            min_clip_duration,
        }
    }

    /// Rebuild a timeline from existing clips, keeping their order.
    pub fn from_clips(clips: Vec<TimelineClip>, min_clip_duration: f64) -> Result<Self> {
        let mut seen = HashSet::with_capacity(clips.len());
        for clip in &clips {
            if !seen.insert(clip.id) {
                return Err(TimelineError::DuplicateClip(clip.id));
            }
        }
        Ok(Self {
            clips: Arc::new(clips),
            selected: None,
            min_clip_duration,
        })
    }

    // ── Queries ─────────────────────────────────────────────────

    pub fn min_clip_duration(&self) -> f64 {
        self.min_clip_duration
    }

    /// Clips in sequence order.
    pub fn clips(&self) -> &[TimelineClip] {
        &self.clips
    }

    /// A shared, immutable view of the current clip list.
    pub fn snapshot(&self) -> Arc<Vec<TimelineClip>> {
        Arc::clone(&self.clips)
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// Find a clip by id.
    pub fn get(&self, id: ClipId) -> Option<&TimelineClip> {
        self.clips.iter().find(|c| c.id == id)
    }

    /// Sequence index of a clip.
    pub fn position_of(&self, id: ClipId) -> Option<usize> {
        self.clips.iter().position(|c| c.id == id)
    }

    /// Currently selected clip.
    pub fn selected(&self) -> Option<ClipId> {
        self.selected
    }

    /// Change the selection. Selecting an unknown clip is an error.
    pub fn select(&mut self, id: Option<ClipId>) -> Result<()> {
        if let Some(id) = id {
            if self.get(id).is_none() {
                return Err(TimelineError::ClipNotFound(id));
            }
        }
        self.selected = id;
        Ok(())
    }

    /// Latest effective end over all clips, 0 when empty.
    pub fn end_position(&self) -> f64 {
        self.clips
            .iter()
            .map(TimelineClip::end_time)
            .fold(0.0, f64::max)
    }

    /// Timeline duration: latest end over clips whose media resolves.
    pub fn duration(&self, catalog: &MediaCatalog) -> f64 {
        self.clips
            .iter()
            .filter(|c| catalog.contains(c.media_id))
            .map(TimelineClip::end_time)
            .fold(0.0, f64::max)
    }

    /// Clips whose media reference does not resolve.
    pub fn dangling_clips(&self, catalog: &MediaCatalog) -> Vec<ClipId> {
        self.clips
            .iter()
            .filter(|c| !catalog.contains(c.media_id))
            .map(|c| c.id)
            .collect()
    }

    // ── Mutations ───────────────────────────────────────────────

    /// Append a clip of the whole asset directly after the current end,
    /// and select it.
    pub fn insert_at_end(
        &mut self,
        catalog: &MediaCatalog,
        media_id: MediaId,
    ) -> Result<TimelineClip> {
        let start = self.end_position();
        let clip = self.new_full_clip(catalog, media_id, start, 0)?;

        let mut next = self.clips.as_ref().clone();
        next.push(clip.clone());
        self.commit(next);
        self.selected = Some(clip.id);

        debug!(clip = %clip.id, media = %media_id, start, "Clip appended");
        Ok(clip)
    }

    /// Place a clip of the whole asset at an explicit position. Overlaps
    /// with existing clips are allowed and nothing is reflowed.
    pub fn insert_at(
        &mut self,
        catalog: &MediaCatalog,
        media_id: MediaId,
        start_time_sec: f64,
        track: u32,
    ) -> Result<TimelineClip> {
        let start = if start_time_sec.is_finite() {
            start_time_sec.max(0.0)
        } else {
            0.0
        };
        let clip = self.new_full_clip(catalog, media_id, start, track)?;

        let mut next = self.clips.as_ref().clone();
        next.push(clip.clone());
        self.commit(next);

        debug!(clip = %clip.id, media = %media_id, start, track, "Clip inserted");
        Ok(clip)
    }

    /// Move one edge of a clip's trim window toward `new_boundary`.
    ///
    /// The result is clamped so the window stays inside `[0, media duration]`
    /// and at least the minimum clip duration long. `start_time_sec` is left
    /// alone; closing the resulting gap is `reflow`'s job.
    pub fn trim(
        &mut self,
        catalog: &MediaCatalog,
        clip_id: ClipId,
        edge: TrimEdge,
        new_boundary: f64,
    ) -> Result<TimelineClip> {
        let index = self
            .position_of(clip_id)
            .ok_or(TimelineError::ClipNotFound(clip_id))?;
        let current = &self.clips[index];
        let media = catalog
            .get(current.media_id)
            .ok_or(TimelineError::MediaNotFound(current.media_id))?;

        let (in_sec, out_sec) = clamp_trim(
            current,
            media.duration_sec,
            edge,
            new_boundary,
            self.min_clip_duration,
        );
        self.replace_window(index, in_sec, out_sec)
    }

    /// Set a clip's trim window to exact values, bypassing clamping.
    /// Used to restore a snapshot taken before a gesture.
    pub fn set_trim_window(
        &mut self,
        clip_id: ClipId,
        in_sec: f64,
        out_sec: f64,
    ) -> Result<TimelineClip> {
        let index = self
            .position_of(clip_id)
            .ok_or(TimelineError::ClipNotFound(clip_id))?;
        self.replace_window(index, in_sec, out_sec)
    }

    /// Delete a clip. Remaining clips keep their positions.
    pub fn remove(&mut self, clip_id: ClipId) -> Result<TimelineClip> {
        let index = self
            .position_of(clip_id)
            .ok_or(TimelineError::ClipNotFound(clip_id))?;

        let mut next = self.clips.as_ref().clone();
        let removed = next.remove(index);
        self.commit(next);
        if self.selected == Some(clip_id) {
            self.selected = None;
        }

        debug!(clip = %clip_id, "Clip removed");
        Ok(removed)
    }

    /// Close every gap and overlap.
    ///
    /// Clips are stably sorted by their current start time, then laid end
    /// to end from zero. The sequence order becomes the sorted order.
    /// Returns how many clips changed position.
    pub fn reflow(&mut self) -> usize {
        let mut next = self.clips.as_ref().clone();
        next.sort_by(|a, b| a.start_time_sec.total_cmp(&b.start_time_sec));

        let mut cursor = 0.0;
        let mut moved = 0;
        for clip in &mut next {
            if clip.start_time_sec != cursor {
                moved += 1;
            }
            clip.start_time_sec = cursor;
            cursor = clip.end_time();
        }

        self.commit(next);
        info!(clips = self.clips.len(), moved, end = cursor, "Timeline reflowed");
        moved
    }

    // ── Helpers ─────────────────────────────────────────────────

    fn new_full_clip(
        &self,
        catalog: &MediaCatalog,
        media_id: MediaId,
        start: f64,
        track: u32,
    ) -> Result<TimelineClip> {
        let media = catalog
            .get(media_id)
            .ok_or(TimelineError::MediaNotFound(media_id))?;
        if media.duration_sec < self.min_clip_duration {
            return Err(TimelineError::MediaTooShort {
                media: media_id,
                duration: media.duration_sec,
                min: self.min_clip_duration,
            });
        }
        let mut clip = TimelineClip::new(media_id, start, 0.0, media.duration_sec);
        clip.track = track;
        Ok(clip)
    }

    fn replace_window(&mut self, index: usize, in_sec: f64, out_sec: f64) -> Result<TimelineClip> {
        let current = &self.clips[index];
        if current.in_sec == in_sec && current.out_sec == out_sec {
            return Ok(current.clone());
        }

        let mut next = self.clips.as_ref().clone();
        let clip = &mut next[index];
        clip.in_sec = in_sec;
        clip.out_sec = out_sec;
        let updated = clip.clone();
        self.commit(next);

        debug!(clip = %updated.id, in_sec, out_sec, "Trim window updated");
        Ok(updated)
    }

    fn commit(&mut self, next: Vec<TimelineClip>) {
        self.clips = Arc::new(next);
    }
}

impl Default for TimelineModel {
    fn default() -> Self {
        Self::new()
    }
}

/// Compute the clamped `(in, out)` for trimming `edge` of `clip` toward
/// `boundary`.
///
/// The edited bound never crosses the opposite bound minus `min_duration`
/// and never leaves `[0, media_duration]`. A NaN boundary leaves the
/// window as it is.
pub fn clamp_trim(
    clip: &TimelineClip,
    media_duration: f64,
    edge: TrimEdge,
    boundary: f64,
    min_duration: f64,
) -> (f64, f64) {
    if boundary.is_nan() {
        return (clip.in_sec, clip.out_sec);
    }
    match edge {
        TrimEdge::Left => {
            let upper = clip.out_sec - min_duration;
            let in_sec = boundary.min(upper).max(0.0);
            (in_sec, clip.out_sec)
        }
        TrimEdge::Right => {
            let lower = clip.in_sec + min_duration;
            let out_sec = boundary.max(lower).min(media_duration);
            (clip.in_sec, out_sec)
        }
    }
}
