//! The playback cursor: one playhead over many clips.
//!
//! The cursor owns the playhead and the index of the clip currently loaded
//! into the engine. User seeks resolve the playhead to a clip by linear
//! scan; during playback the host calls [`PlaybackCursor::tick`] every
//! frame and the cursor follows the engine's native time, hopping to the
//! next clip when the active one reaches its out point.

use clipforge_core::{ClipId, MediaId};
use clipforge_timeline::{MediaCatalog, TimelineClip, TimelineError, TimelineModel};
use tracing::{debug, info, warn};

use crate::engine::PlaybackEngine;
use crate::error::Result;

/// Where a timeline position lands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    /// Sequence index of the containing clip.
    pub index: usize,
    pub clip_id: ClipId,
    /// Source-relative time inside the clip's media.
    pub source_time: f64,
}

/// Find the clip containing `position`.
///
/// Intervals are closed, so a position on a shared boundary belongs to the
/// earlier clip in sequence order. Under overlap the first match wins.
pub fn resolve(clips: &[TimelineClip], position: f64) -> Option<Resolution> {
    clips
        .iter()
        .enumerate()
        .find(|(_, clip)| clip.contains_time(position))
        .map(|(index, clip)| Resolution {
            index,
            clip_id: clip.id,
            source_time: clip.source_time_at(position),
        })
}

/// What a frame of playback did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Not playing.
    Idle,
    /// The engine has no frame yet; playhead untouched.
    Waiting,
    /// Playhead followed the engine inside the active clip.
    Advanced { playhead: f64 },
    /// Playback moved on to another clip.
    Crossed { index: usize, playhead: f64 },
    /// The last clip ended and playback stopped.
    Finished,
}

/// Playhead and transport state.
#[derive(Debug, Clone, Default)]
pub struct PlaybackCursor {
    playhead: f64,
    playing: bool,
    active_index: usize,
    active_clip: Option<ClipId>,
    /// Timeline start of the active clip when it was entered.
    active_start: f64,
    loaded: Option<MediaId>,
    restart_from_first: bool,
}

impl PlaybackCursor {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ─────────────────────────────────────────────────

    /// Global timeline position in seconds.
    pub fn playhead(&self) -> f64 {
        self.playhead
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn active_index(&self) -> usize {
        self.active_index
    }

    /// Clip whose media is positioned in the engine, if any.
    pub fn active_clip(&self) -> Option<ClipId> {
        self.active_clip
    }

    /// Media currently loaded into the engine.
    pub fn loaded_media(&self) -> Option<MediaId> {
        self.loaded
    }

    /// True when no clip is positioned, e.g. the playhead sits in a gap.
    pub fn is_parked(&self) -> bool {
        self.active_clip.is_none()
    }

    // ── Transport ───────────────────────────────────────────────

    /// Move the playhead to `target`, clamped into the timeline.
    ///
    /// Loads the containing clip's media when it differs from the loaded
    /// one. A target in a gap, or on a clip with missing media, parks the
    /// cursor. When playing, playback carries on from the new position.
    pub fn seek<E: PlaybackEngine>(
        &mut self,
        model: &TimelineModel,
        catalog: &MediaCatalog,
        engine: &mut E,
        target: f64,
    ) -> Result<()> {
        let target = if target.is_nan() {
            0.0
        } else {
            target.max(0.0).min(model.duration(catalog))
        };

        match resolve(model.clips(), target) {
            Some(hit) => {
                let clip = &model.clips()[hit.index];
                if catalog.contains(clip.media_id) {
                    self.enter(catalog, engine, hit.index, clip, hit.source_time, self.playing)?;
                } else {
                    warn!(clip = %clip.id, media = %clip.media_id, "Seek landed on clip with missing media");
                    self.park(engine)?;
                }
            }
            None => self.park(engine)?,
        }

        self.playhead = target;
        self.restart_from_first = false;
        debug!(playhead = target, active = ?self.active_clip, "Seek");
        Ok(())
    }

    /// Position the playhead at the start of a clip and make it active,
    /// even when an earlier clip ends exactly there.
    pub fn jump_to_clip<E: PlaybackEngine>(
        &mut self,
        model: &TimelineModel,
        catalog: &MediaCatalog,
        engine: &mut E,
        clip_id: ClipId,
    ) -> Result<()> {
        let index = model
            .position_of(clip_id)
            .ok_or(TimelineError::ClipNotFound(clip_id))?;
        let clip = &model.clips()[index];
        if !catalog.contains(clip.media_id) {
            return Err(TimelineError::MediaNotFound(clip.media_id).into());
        }

        self.enter(catalog, engine, index, clip, clip.in_sec, self.playing)?;
        self.playhead = clip.start_time_sec;
        self.restart_from_first = false;
        debug!(clip = %clip_id, playhead = self.playhead, "Jumped to clip");
        Ok(())
    }

    /// Start playback from the playhead. After the timeline has played to
    /// the end, playback restarts from the first clip.
    ///
    /// Returns false when there is nothing playable.
    pub fn play<E: PlaybackEngine>(
        &mut self,
        model: &TimelineModel,
        catalog: &MediaCatalog,
        engine: &mut E,
    ) -> Result<bool> {
        if self.playing {
            return Ok(true);
        }

        let Some((index, source_time, playhead)) = self.entry_point(model, catalog) else {
            debug!("Nothing playable on the timeline");
            return Ok(false);
        };

        let clip = &model.clips()[index];
        self.enter(catalog, engine, index, clip, source_time, true)?;
        self.playing = true;
        self.playhead = playhead;
        self.restart_from_first = false;
        info!(playhead, index, "Playback started");
        Ok(true)
    }

    pub fn pause<E: PlaybackEngine>(&mut self, engine: &mut E) -> Result<()> {
        if !self.playing {
            return Ok(());
        }
        engine.pause()?;
        self.playing = false;
        info!(playhead = self.playhead, "Playback paused");
        Ok(())
    }

    /// Play when paused, pause when playing. Returns the new playing state.
    pub fn toggle<E: PlaybackEngine>(
        &mut self,
        model: &TimelineModel,
        catalog: &MediaCatalog,
        engine: &mut E,
    ) -> Result<bool> {
        if self.playing {
            self.pause(engine)?;
            Ok(false)
        } else {
            self.play(model, catalog, engine)
        }
    }

    /// Pause and rewind: playhead 0, active index 0.
    pub fn stop<E: PlaybackEngine>(&mut self, engine: &mut E) -> Result<()> {
        if self.loaded.is_some() {
            engine.pause()?;
        }
        self.playing = false;
        self.playhead = 0.0;
        self.active_index = 0;
        self.active_clip = None;
        self.restart_from_first = false;
        info!("Playback stopped");
        Ok(())
    }

    /// Per-frame poll while playing.
    pub fn tick<E: PlaybackEngine>(
        &mut self,
        model: &TimelineModel,
        catalog: &MediaCatalog,
        engine: &mut E,
    ) -> Result<TickOutcome> {
        if !self.playing {
            return Ok(TickOutcome::Idle);
        }

        let Some(index) = self.refresh_active(model) else {
            return self.skip_gap(model, catalog, engine);
        };
        let Some(native) = engine.current_time() else {
            return Ok(TickOutcome::Waiting);
        };

        let clip = &model.clips()[index];
        if native >= clip.out_sec {
            return self.cross(model, catalog, engine);
        }

        let position = clip.timeline_time_of(native).min(model.duration(catalog));
        if clip.start_time_sec != self.active_start {
            // An edit moved the clip under us; follow it.
            self.active_start = clip.start_time_sec;
            self.playhead = position;
        } else {
            self.playhead = self.playhead.max(position);
        }
        Ok(TickOutcome::Advanced {
            playhead: self.playhead,
        })
    }

    /// Bring the cursor back in line after the timeline was edited.
    ///
    /// The playhead is first clamped into the new duration, before the
    /// engine is touched, so it stays in range even when the engine fails.
    /// While playing, the playhead follows the active clip if it moved.
    /// While paused, the playhead is resolved again as by [`Self::seek`].
    pub fn resync<E: PlaybackEngine>(
        &mut self,
        model: &TimelineModel,
        catalog: &MediaCatalog,
        engine: &mut E,
    ) -> Result<()> {
        let duration = model.duration(catalog);
        if self.playhead > duration {
            debug!(from = self.playhead, to = duration, "Playhead clamped after edit");
            self.playhead = duration;
        }

        if self.playing {
            let Some(index) = self.refresh_active(model) else {
                return Ok(());
            };
            let clip = &model.clips()[index];
            if clip.start_time_sec != self.active_start {
                if let Some(native) = engine.current_time() {
                    self.active_start = clip.start_time_sec;
                    self.playhead = clip.timeline_time_of(native).clamp(0.0, duration);
                }
            }
            return Ok(());
        }

        let restart = self.restart_from_first;
        self.seek(model, catalog, engine, self.playhead)?;
        self.restart_from_first = restart;
        Ok(())
    }

    /// The engine reported end of media. Handled like reaching the out point.
    pub fn on_ended<E: PlaybackEngine>(
        &mut self,
        model: &TimelineModel,
        catalog: &MediaCatalog,
        engine: &mut E,
    ) -> Result<TickOutcome> {
        if self.refresh_active(model).is_some() {
            self.cross(model, catalog, engine)
        } else if self.playing {
            self.skip_gap(model, catalog, engine)
        } else {
            Ok(TickOutcome::Idle)
        }
    }

    // ── Internals ───────────────────────────────────────────────

    /// Advance to the next clip in sequence order with resolvable media.
    fn cross<E: PlaybackEngine>(
        &mut self,
        model: &TimelineModel,
        catalog: &MediaCatalog,
        engine: &mut E,
    ) -> Result<TickOutcome> {
        let next = model
            .clips()
            .iter()
            .enumerate()
            .skip(self.active_index + 1)
            .find(|(_, clip)| playable(catalog, clip));

        match next {
            Some((index, clip)) => {
                self.enter(catalog, engine, index, clip, clip.in_sec, self.playing)?;
                self.playhead = clip.start_time_sec;
                debug!(index, clip = %clip.id, playhead = self.playhead, "Crossed clip boundary");
                Ok(TickOutcome::Crossed {
                    index,
                    playhead: self.playhead,
                })
            }
            None => self.finish(engine),
        }
    }

    /// Playing through a gap: jump to the nearest playable clip ahead.
    fn skip_gap<E: PlaybackEngine>(
        &mut self,
        model: &TimelineModel,
        catalog: &MediaCatalog,
        engine: &mut E,
    ) -> Result<TickOutcome> {
        match next_after(model, catalog, self.playhead) {
            Some(index) => {
                let clip = &model.clips()[index];
                self.enter(catalog, engine, index, clip, clip.in_sec, true)?;
                self.playhead = clip.start_time_sec;
                Ok(TickOutcome::Crossed {
                    index,
                    playhead: self.playhead,
                })
            }
            None => self.finish(engine),
        }
    }

    fn finish<E: PlaybackEngine>(&mut self, engine: &mut E) -> Result<TickOutcome> {
        engine.pause()?;
        self.playing = false;
        self.active_index = 0;
        self.active_clip = None;
        self.restart_from_first = true;
        info!(playhead = self.playhead, "Reached end of timeline");
        Ok(TickOutcome::Finished)
    }

    /// Load (if needed) and position `clip` in the engine, then commit it as
    /// the active clip. Nothing is committed when the engine fails.
    fn enter<E: PlaybackEngine>(
        &mut self,
        catalog: &MediaCatalog,
        engine: &mut E,
        index: usize,
        clip: &TimelineClip,
        source_time: f64,
        resume: bool,
    ) -> Result<()> {
        let media = catalog
            .get(clip.media_id)
            .ok_or(TimelineError::MediaNotFound(clip.media_id))?;

        if self.loaded != Some(media.id) {
            engine.load(&media.source_path)?;
            self.loaded = Some(media.id);
            debug!(media = %media.id, path = %media.source_path.display(), "Loaded media");
        }
        engine.seek(source_time)?;
        if resume {
            engine.play()?;
        }

        self.active_index = index;
        self.active_clip = Some(clip.id);
        self.active_start = clip.start_time_sec;
        Ok(())
    }

    fn park<E: PlaybackEngine>(&mut self, engine: &mut E) -> Result<()> {
        if self.playing {
            engine.pause()?;
        }
        self.active_clip = None;
        Ok(())
    }

    /// Re-find the active clip after edits. Parks if it was removed.
    fn refresh_active(&mut self, model: &TimelineModel) -> Option<usize> {
        let id = self.active_clip?;
        match model.position_of(id) {
            Some(index) => {
                self.active_index = index;
                Some(index)
            }
            None => {
                self.active_clip = None;
                None
            }
        }
    }

    /// Where `play` should start: `(index, source time, playhead)`.
    ///
    /// A playhead at the very end starts over, like a finished timeline.
    fn entry_point(&self, model: &TimelineModel, catalog: &MediaCatalog) -> Option<(usize, f64, f64)> {
        if self.restart_from_first || self.playhead >= model.duration(catalog) {
            let (index, clip) = model
                .clips()
                .iter()
                .enumerate()
                .find(|(_, clip)| playable(catalog, clip))?;
            return Some((index, clip.in_sec, clip.start_time_sec));
        }

        if let Some(hit) = resolve(model.clips(), self.playhead) {
            if catalog.contains(model.clips()[hit.index].media_id) {
                return Some((hit.index, hit.source_time, self.playhead));
            }
        }

        let index = next_after(model, catalog, self.playhead)?;
        let clip = &model.clips()[index];
        Some((index, clip.in_sec, clip.start_time_sec))
    }
}

fn playable(catalog: &MediaCatalog, clip: &TimelineClip) -> bool {
    let ok = catalog.contains(clip.media_id);
    if !ok {
        warn!(clip = %clip.id, media = %clip.media_id, "Skipping clip with missing media");
    }
    ok
}

/// Playable clip with the earliest start at or after `position`.
fn next_after(model: &TimelineModel, catalog: &MediaCatalog, position: f64) -> Option<usize> {
    model
        .clips()
        .iter()
        .enumerate()
        .filter(|(_, clip)| clip.start_time_sec >= position && catalog.contains(clip.media_id))
        .min_by(|(_, a), (_, b)| a.start_time_sec.total_cmp(&b.start_time_sec))
        .map(|(index, _)| index)
}
