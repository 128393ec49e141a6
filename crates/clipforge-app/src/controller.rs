//! The editor controller: explicit application state plus the operations
//! views invoke on it.
//!
//! Every state change is announced on the [`EventBus`], so views redraw from
//! events instead of watching the state for changes.

use std::path::{Path, PathBuf};

use clipforge_core::{ClipId, EditorConfig, MediaId, Vec2};
use clipforge_media::{Encoder, ExportCancel, ExportProgress, MediaInspector};
use clipforge_playback::{PlaybackCursor, PlaybackEngine, TickOutcome};
use clipforge_timeline::{
    ClipHit, DragTransfer, DropOutcome, ExportPlan, ExportRequestBuilder, HitZone, MediaAsset,
    MediaCatalog, PendingTrim, ReleaseOutcome, TimelineClip, TimelineGeometry, TimelineModel,
    TrimEdge, TrimError, TrimNegotiation, TrimPhase,
};
use crossbeam_channel::Receiver;
use tracing::{info, warn};

use crate::error::Result;
use crate::events::{EditorEvent, EventBus};

/// Everything the editor knows, in one place.
#[derive(Debug)]
pub struct EditorState {
    pub catalog: MediaCatalog,
    pub timeline: TimelineModel,
    pub cursor: PlaybackCursor,
    pub trim: TrimNegotiation,
    pub drag: DragTransfer,
    pub zoom: f32,
    pub scroll_x: f32,
}

impl EditorState {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            catalog: MediaCatalog::new(),
            timeline: TimelineModel::with_min_clip_duration(config.min_clip_duration),
            cursor: PlaybackCursor::new(),
            trim: TrimNegotiation::new(),
            drag: DragTransfer::new(),
            zoom: config.timeline.default_zoom,
            scroll_x: 0.0,
        }
    }
}

/// What releasing the pointer over the timeline finished.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerRelease {
    Nothing,
    Trim(ReleaseOutcome),
    Drop(DropOutcome),
}

/// Owns the editor state and the playback engine.
pub struct EditorController<E: PlaybackEngine> {
    config: EditorConfig,
    state: EditorState,
    engine: E,
    events: EventBus,
}

impl<E: PlaybackEngine> EditorController<E> {
    pub fn new(config: EditorConfig, engine: E) -> Self {
        let state = EditorState::new(&config);
        Self {
            config,
            state,
            engine,
            events: EventBus::new(),
        }
    }

    // ── Access ──────────────────────────────────────────────────

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// The engine, for hosts that forward clocks or platform events to it.
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn subscribe(&mut self) -> Receiver<EditorEvent> {
        self.events.subscribe()
    }

    pub fn clips(&self) -> &[TimelineClip] {
        self.state.timeline.clips()
    }

    pub fn playhead(&self) -> f64 {
        self.state.cursor.playhead()
    }

    pub fn is_playing(&self) -> bool {
        self.state.cursor.is_playing()
    }

    /// Timeline length over clips with resolvable media.
    pub fn timeline_duration(&self) -> f64 {
        self.state.timeline.duration(&self.state.catalog)
    }

    /// Length the canvas is drawn at, never below the configured minimum.
    pub fn display_duration(&self) -> f64 {
        self.timeline_duration()
            .max(self.config.timeline.min_display_duration)
    }

    /// Canvas geometry at the current zoom and scroll.
    pub fn geometry(&self) -> TimelineGeometry {
        TimelineGeometry::from_settings(&self.config.timeline, self.state.zoom)
            .with_scroll(self.state.scroll_x)
    }

    // ── Library ─────────────────────────────────────────────────

    /// Probe `path` and add it to the library. A failed probe adds nothing.
    pub fn import_media(&mut self, inspector: &dyn MediaInspector, path: &Path) -> Result<MediaId> {
        let report = inspector.inspect(path)?;
        Ok(self.add_media(report.into_asset()))
    }

    /// Add an already probed asset.
    pub fn add_media(&mut self, asset: MediaAsset) -> MediaId {
        let name = asset.name.clone();
        let media_id = self.state.catalog.add(asset);
        info!(media = %media_id, %name, "Media imported");
        self.events
            .emit(EditorEvent::MediaImported { media_id, name });
        media_id
    }

    /// Remove an asset from the library. Clips using it are left dangling
    /// and skipped by playback and export.
    pub fn remove_media(&mut self, media_id: MediaId) -> Option<MediaAsset> {
        let asset = self.state.catalog.remove(media_id)?;
        let dangling: Vec<ClipId> = self
            .clips()
            .iter()
            .filter(|c| c.media_id == media_id)
            .map(|c| c.id)
            .collect();
        if !dangling.is_empty() {
            warn!(media = %media_id, clips = dangling.len(), "Removed media still used on the timeline");
        }
        self.events
            .emit(EditorEvent::MediaRemoved { media_id, dangling });
        self.resync_cursor();
        Some(asset)
    }

    pub fn attach_transcript(&mut self, media_id: MediaId, text: impl Into<String>) -> bool {
        self.state.catalog.attach_transcript(media_id, text)
    }

    // ── Timeline editing ────────────────────────────────────────

    /// Append the whole asset after the current end and select it. This is
    /// what a library double-click does.
    pub fn append_to_timeline(&mut self, media_id: MediaId) -> Result<TimelineClip> {
        let clip = self
            .state
            .timeline
            .insert_at_end(&self.state.catalog, media_id)?;
        self.events.emit(EditorEvent::ClipInserted {
            clip_id: clip.id,
            start_time_sec: clip.start_time_sec,
        });
        self.events
            .emit(EditorEvent::SelectionChanged(Some(clip.id)));
        self.resync_cursor();
        Ok(clip)
    }

    /// Place the whole asset at an explicit position.
    pub fn insert_clip_at(
        &mut self,
        media_id: MediaId,
        start_time_sec: f64,
        track: u32,
    ) -> Result<TimelineClip> {
        let clip = self.state.timeline.insert_at(
            &self.state.catalog,
            media_id,
            start_time_sec,
            track,
        )?;
        self.events.emit(EditorEvent::ClipInserted {
            clip_id: clip.id,
            start_time_sec: clip.start_time_sec,
        });
        self.resync_cursor();
        Ok(clip)
    }

    /// Delete a clip. A clip under an open trim gesture cannot be removed.
    pub fn remove_clip(&mut self, clip_id: ClipId) -> Result<TimelineClip> {
        if self.state.trim.active_clip() == Some(clip_id) {
            return Err(TrimError::GestureInProgress(clip_id).into());
        }
        let was_selected = self.state.timeline.selected() == Some(clip_id);
        let removed = self.state.timeline.remove(clip_id)?;
        self.events.emit(EditorEvent::ClipRemoved { clip_id });
        if was_selected {
            self.events.emit(EditorEvent::SelectionChanged(None));
        }
        self.resync_cursor();
        Ok(removed)
    }

    /// Remove the selected clip, if any.
    pub fn remove_selected(&mut self) -> Result<Option<TimelineClip>> {
        match self.state.timeline.selected() {
            Some(id) => self.remove_clip(id).map(Some),
            None => Ok(None),
        }
    }

    /// Close all gaps and overlaps.
    pub fn reflow(&mut self) -> usize {
        let moved = self.state.timeline.reflow();
        self.events.emit(EditorEvent::TimelineReflowed { moved });
        self.resync_cursor();
        moved
    }

    pub fn select_clip(&mut self, clip_id: Option<ClipId>) -> Result<()> {
        if self.state.timeline.selected() == clip_id {
            return Ok(());
        }
        self.state.timeline.select(clip_id)?;
        self.events.emit(EditorEvent::SelectionChanged(clip_id));
        Ok(())
    }

    // ── Trim gestures ───────────────────────────────────────────

    pub fn trim_begin(&mut self, clip_id: ClipId, edge: TrimEdge) -> Result<()> {
        self.state.trim.begin(&self.state.timeline, clip_id, edge)?;
        Ok(())
    }

    /// Live trim to a source-relative boundary.
    pub fn trim_drag(&mut self, boundary: f64) -> Result<()> {
        self.state
            .trim
            .drag_to(&mut self.state.timeline, &self.state.catalog, boundary)?;
        if let Some(clip) = self
            .state
            .trim
            .active_clip()
            .and_then(|id| self.state.timeline.get(id))
        {
            self.events.emit(EditorEvent::ClipTrimmed {
                clip_id: clip.id,
                in_sec: clip.in_sec,
                out_sec: clip.out_sec,
            });
        }
        self.resync_cursor();
        Ok(())
    }

    /// Live trim following the pointer at canvas `x`.
    ///
    /// The clip's start does not move during a trim, so the pointer's
    /// timeline time maps to source time through the window captured when
    /// the gesture began.
    pub fn trim_drag_to_x(&mut self, x: f32) -> Result<()> {
        let TrimPhase::Dragging {
            clip_id, old_in, ..
        } = *self.state.trim.phase()
        else {
            return self.trim_drag(f64::NAN);
        };
        let Some(start) = self.state.timeline.get(clip_id).map(|c| c.start_time_sec) else {
            return self.trim_drag(f64::NAN);
        };
        let time = self.geometry().time_at_x(x);
        self.trim_drag(old_in + (time - start))
    }

    /// Finish the pointer gesture. A changed clip waits for confirmation.
    pub fn trim_release(&mut self) -> Result<ReleaseOutcome> {
        let outcome = self.state.trim.release(&self.state.timeline)?;
        if let ReleaseOutcome::PendingConfirmation(pending) = &outcome {
            self.events.emit(EditorEvent::TrimPending(pending.clone()));
        }
        Ok(outcome)
    }

    /// Keep the trim and reflow the timeline.
    pub fn trim_confirm(&mut self) -> Result<PendingTrim> {
        let (pending, moved) = self.state.trim.confirm(&mut self.state.timeline)?;
        self.events.emit(EditorEvent::TrimConfirmed {
            clip_id: pending.clip_id,
        });
        self.events.emit(EditorEvent::TimelineReflowed { moved });
        self.resync_cursor();
        Ok(pending)
    }

    /// Put the clip back the way it was before the gesture.
    pub fn trim_cancel(&mut self) -> Result<()> {
        let clip_id = self.state.trim.active_clip();
        self.state.trim.cancel(&mut self.state.timeline)?;
        if let Some(clip_id) = clip_id {
            self.events.emit(EditorEvent::TrimCancelled { clip_id });
        }
        self.resync_cursor();
        Ok(())
    }

    /// Confirmation prompt for the pending trim.
    pub fn trim_prompt(&self) -> Option<String> {
        let pending = self.state.trim.pending()?;
        let name = self
            .state
            .timeline
            .get(pending.clip_id)
            .and_then(|c| self.state.catalog.get(c.media_id))
            .map_or("clip", |m| m.name.as_str());
        Some(pending.describe(name))
    }

    // ── Library drag ────────────────────────────────────────────

    pub fn begin_drag(&mut self, media_id: MediaId, cursor: Vec2) {
        self.state.drag.start(media_id, cursor);
        self.events.emit(EditorEvent::DragChanged {
            media_id: Some(media_id),
        });
    }

    pub fn drag_move(&mut self, point: Vec2) -> bool {
        self.state.drag.move_to(point)
    }

    /// Drop the dragged media at canvas `point`.
    pub fn drop_on_timeline(&mut self, point: Vec2) -> Result<DropOutcome> {
        let geometry = self.geometry();
        let result = self.state.drag.drop_at(
            &mut self.state.timeline,
            &self.state.catalog,
            &geometry,
            point,
        );
        self.events.emit(EditorEvent::DragChanged { media_id: None });
        let outcome = result?;
        if let DropOutcome::Inserted(clip) = &outcome {
            self.events.emit(EditorEvent::ClipInserted {
                clip_id: clip.id,
                start_time_sec: clip.start_time_sec,
            });
            self.resync_cursor();
        }
        Ok(outcome)
    }

    pub fn cancel_drag(&mut self) {
        if self.state.drag.is_dragging() {
            self.state.drag.cancel();
            self.events.emit(EditorEvent::DragChanged { media_id: None });
        }
    }

    // ── Pointer routing ─────────────────────────────────────────

    /// Pointer pressed on the canvas. Handles start a trim, the clip body
    /// selects and seeks, empty canvas deselects and seeks.
    pub fn click_timeline(&mut self, point: Vec2) -> Result<Option<ClipHit>> {
        let geometry = self.geometry();
        let hit = geometry.hit_test(self.clips(), point);
        match hit {
            Some(ClipHit { clip_id, zone }) => {
                self.select_clip(Some(clip_id))?;
                match zone {
                    HitZone::LeftHandle => self.trim_begin(clip_id, TrimEdge::Left)?,
                    HitZone::RightHandle => self.trim_begin(clip_id, TrimEdge::Right)?,
                    HitZone::Body => self.seek(geometry.time_at_x(point.x))?,
                }
            }
            None => {
                self.select_clip(None)?;
                self.seek(geometry.time_at_x(point.x))?;
            }
        }
        Ok(hit)
    }

    /// Pointer moved over the canvas.
    pub fn pointer_move(&mut self, point: Vec2) -> Result<()> {
        if matches!(self.state.trim.phase(), TrimPhase::Dragging { .. }) {
            self.trim_drag_to_x(point.x)
        } else {
            self.drag_move(point);
            Ok(())
        }
    }

    /// Pointer released over the canvas.
    pub fn pointer_up(&mut self, point: Vec2) -> Result<PointerRelease> {
        if matches!(self.state.trim.phase(), TrimPhase::Dragging { .. }) {
            return Ok(PointerRelease::Trim(self.trim_release()?));
        }
        if self.state.drag.is_dragging() {
            return Ok(PointerRelease::Drop(self.drop_on_timeline(point)?));
        }
        Ok(PointerRelease::Nothing)
    }

    /// Escape or pointer leaving the window: abandon whatever is in flight.
    pub fn abort_gesture(&mut self) -> Result<()> {
        self.cancel_drag();
        if matches!(self.state.trim.phase(), TrimPhase::Dragging { .. }) {
            self.trim_cancel()?;
        }
        Ok(())
    }

    // ── Transport ───────────────────────────────────────────────

    pub fn seek(&mut self, target: f64) -> Result<()> {
        self.state.cursor.seek(
            &self.state.timeline,
            &self.state.catalog,
            &mut self.engine,
            target,
        )?;
        self.events
            .emit(EditorEvent::PlayheadMoved(self.state.cursor.playhead()));
        Ok(())
    }

    /// Put the playhead on the first frame of `clip_id`.
    pub fn jump_to_clip(&mut self, clip_id: ClipId) -> Result<()> {
        self.state.cursor.jump_to_clip(
            &self.state.timeline,
            &self.state.catalog,
            &mut self.engine,
            clip_id,
        )?;
        self.events
            .emit(EditorEvent::PlayheadMoved(self.state.cursor.playhead()));
        Ok(())
    }

    pub fn play(&mut self) -> Result<bool> {
        let before = self.state.cursor.playhead();
        let started =
            self.state
                .cursor
                .play(&self.state.timeline, &self.state.catalog, &mut self.engine)?;
        if started {
            self.events
                .emit(EditorEvent::PlaybackChanged { playing: true });
            self.emit_if_moved(before);
        }
        Ok(started)
    }

    pub fn pause(&mut self) -> Result<()> {
        let was_playing = self.is_playing();
        self.state.cursor.pause(&mut self.engine)?;
        if was_playing {
            self.events
                .emit(EditorEvent::PlaybackChanged { playing: false });
        }
        Ok(())
    }

    pub fn toggle_play(&mut self) -> Result<bool> {
        if self.is_playing() {
            self.pause()?;
            Ok(false)
        } else {
            self.play()
        }
    }

    pub fn stop(&mut self) -> Result<()> {
        let was_playing = self.is_playing();
        self.state.cursor.stop(&mut self.engine)?;
        if was_playing {
            self.events
                .emit(EditorEvent::PlaybackChanged { playing: false });
        }
        self.events.emit(EditorEvent::PlayheadMoved(0.0));
        Ok(())
    }

    /// Per-frame poll. Call once per rendered frame while playing.
    pub fn tick(&mut self) -> Result<TickOutcome> {
        let before = self.state.cursor.playhead();
        let outcome =
            self.state
                .cursor
                .tick(&self.state.timeline, &self.state.catalog, &mut self.engine)?;
        self.announce(outcome, before);
        Ok(outcome)
    }

    /// Forward the engine's end-of-media notification.
    pub fn on_engine_ended(&mut self) -> Result<TickOutcome> {
        let before = self.state.cursor.playhead();
        let outcome = self.state.cursor.on_ended(
            &self.state.timeline,
            &self.state.catalog,
            &mut self.engine,
        )?;
        self.announce(outcome, before);
        Ok(outcome)
    }

    fn announce(&mut self, outcome: TickOutcome, before: f64) {
        match outcome {
            TickOutcome::Crossed { index, .. } => self.events.emit(EditorEvent::ClipActivated {
                index,
                clip_id: self.state.cursor.active_clip(),
            }),
            TickOutcome::Finished => self
                .events
                .emit(EditorEvent::PlaybackChanged { playing: false }),
            _ => {}
        }
        self.emit_if_moved(before);
    }

    /// Keep the playhead inside the timeline after an edit. The edit itself
    /// already succeeded, so an engine failure here is only logged.
    fn resync_cursor(&mut self) {
        let before = self.state.cursor.playhead();
        if let Err(e) = self.state.cursor.resync(
            &self.state.timeline,
            &self.state.catalog,
            &mut self.engine,
        ) {
            warn!(error = %e, "Could not reposition playback after edit");
        }
        self.emit_if_moved(before);
    }

    fn emit_if_moved(&mut self, before: f64) {
        let now = self.state.cursor.playhead();
        if now != before {
            self.events.emit(EditorEvent::PlayheadMoved(now));
        }
    }

    // ── View ────────────────────────────────────────────────────

    /// Set the zoom level, clamped to the configured range.
    pub fn set_zoom(&mut self, zoom: f32) -> f32 {
        let zoom = self.config.clamp_zoom(zoom);
        if zoom != self.state.zoom {
            self.state.zoom = zoom;
            self.events.emit(EditorEvent::ZoomChanged(zoom));
        }
        zoom
    }

    pub fn set_scroll(&mut self, scroll_x: f32) {
        self.state.scroll_x = scroll_x.max(0.0);
    }

    // ── Export ──────────────────────────────────────────────────

    /// Build the cut list for `output_path`. Skipped clips are announced.
    pub fn build_export(&mut self, output_path: impl AsRef<Path>) -> Result<ExportPlan> {
        let plan = ExportRequestBuilder::new(&self.config.export).build(
            &self.state.timeline,
            &self.state.catalog,
            output_path,
        )?;
        if !plan.skipped.is_empty() {
            self.events
                .emit(EditorEvent::ExportSkipped(plan.skipped.clone()));
        }
        Ok(plan)
    }

    /// Build the cut list and hand it to `encoder`.
    pub fn export(
        &mut self,
        encoder: &dyn Encoder,
        output_path: impl AsRef<Path>,
        cancel: &ExportCancel,
    ) -> Result<PathBuf> {
        let plan = self.build_export(output_path)?;
        let events = &mut self.events;
        let path = encoder.encode(&plan.request, cancel, &mut |progress: ExportProgress| {
            events.emit(EditorEvent::ExportProgress(progress));
        })?;
        self.events.emit(EditorEvent::ExportFinished(path.clone()));
        Ok(path)
    }
}
