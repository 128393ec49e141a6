//! Confirm/cancel negotiation around trim gestures.
//!
//! A trim drag edits the clip live so the canvas can redraw it, but the
//! edit is provisional until the user confirms it. Confirming closes the
//! gap with a reflow; cancelling puts the old window back untouched.

use clipforge_core::time::format_seconds;
use clipforge_core::ClipId;
use tracing::{debug, info};

use crate::clip::TrimEdge;
use crate::error::TrimError;
use crate::media::MediaCatalog;
use crate::model::TimelineModel;

type Result<T> = std::result::Result<T, TrimError>;

/// A finished trim gesture waiting for the user's answer.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingTrim {
    pub clip_id: ClipId,
    pub edge: TrimEdge,
    pub old_in: f64,
    pub old_out: f64,
    pub new_in: f64,
    pub new_out: f64,
}

impl PendingTrim {
    pub fn old_duration(&self) -> f64 {
        self.old_out - self.old_in
    }

    pub fn new_duration(&self) -> f64 {
        self.new_out - self.new_in
    }

    /// Seconds removed from the clip. Negative when the clip was extended.
    pub fn trimmed_amount(&self) -> f64 {
        self.old_duration() - self.new_duration()
    }

    pub fn edge_label(&self) -> &'static str {
        self.edge.label()
    }

    /// Text for the confirmation prompt.
    pub fn describe(&self, clip_name: &str) -> String {
        format!(
            "Trim {} from the {} of \"{}\"? Duration {} -> {}",
            format_seconds(self.trimmed_amount().abs()),
            self.edge_label(),
            clip_name,
            format_seconds(self.old_duration()),
            format_seconds(self.new_duration()),
        )
    }
}

/// Where the negotiation currently stands.
#[derive(Debug, Clone, PartialEq)]
pub enum TrimPhase {
    Idle,
    Dragging {
        clip_id: ClipId,
        edge: TrimEdge,
        old_in: f64,
        old_out: f64,
    },
    PendingConfirmation(PendingTrim),
}

impl TrimPhase {
    pub fn name(&self) -> &'static str {
        match self {
            TrimPhase::Idle => "idle",
            TrimPhase::Dragging { .. } => "dragging",
            TrimPhase::PendingConfirmation(_) => "awaiting confirmation",
        }
    }
}

/// Result of releasing the pointer.
#[derive(Debug, Clone, PartialEq)]
pub enum ReleaseOutcome {
    /// The window did not change; nothing to confirm.
    Unchanged,
    PendingConfirmation(PendingTrim),
}

/// State machine guarding trim edits.
#[derive(Debug, Clone)]
pub struct TrimNegotiation {
    phase: TrimPhase,
}

impl TrimNegotiation {
    pub fn new() -> Self {
        Self {
            phase: TrimPhase::Idle,
        }
    }

    pub fn phase(&self) -> &TrimPhase {
        &self.phase
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.phase, TrimPhase::Idle)
    }

    /// The pending trim, if the gesture is waiting for confirmation.
    pub fn pending(&self) -> Option<&PendingTrim> {
        match &self.phase {
            TrimPhase::PendingConfirmation(pending) => Some(pending),
            _ => None,
        }
    }

    /// Clip under negotiation, if any.
    pub fn active_clip(&self) -> Option<ClipId> {
        match &self.phase {
            TrimPhase::Idle => None,
            TrimPhase::Dragging { clip_id, .. } => Some(*clip_id),
            TrimPhase::PendingConfirmation(pending) => Some(pending.clip_id),
        }
    }

    /// Start a gesture on `edge` of `clip_id`, remembering its window.
    pub fn begin(&mut self, model: &TimelineModel, clip_id: ClipId, edge: TrimEdge) -> Result<()> {
        if let Some(active) = self.active_clip() {
            return Err(TrimError::GestureInProgress(active));
        }
        let clip = model
            .get(clip_id)
            .ok_or(crate::error::TimelineError::ClipNotFound(clip_id))?;

        debug!(clip = %clip_id, edge = edge.label(), "Trim gesture started");
        self.phase = TrimPhase::Dragging {
            clip_id,
            edge,
            old_in: clip.in_sec,
            old_out: clip.out_sec,
        };
        Ok(())
    }

    /// Apply the live trim for a pointer move.
    pub fn drag_to(
        &mut self,
        model: &mut TimelineModel,
        catalog: &MediaCatalog,
        boundary: f64,
    ) -> Result<()> {
        let TrimPhase::Dragging { clip_id, edge, .. } = self.phase else {
            return Err(self.invalid("drag"));
        };
        model.trim(catalog, clip_id, edge, boundary)?;
        Ok(())
    }

    /// End the pointer gesture. A changed window moves to confirmation.
    pub fn release(&mut self, model: &TimelineModel) -> Result<ReleaseOutcome> {
        let TrimPhase::Dragging {
            clip_id,
            edge,
            old_in,
            old_out,
        } = self.phase
        else {
            return Err(self.invalid("release"));
        };

        let Some(clip) = model.get(clip_id) else {
            self.phase = TrimPhase::Idle;
            return Err(crate::error::TimelineError::ClipNotFound(clip_id).into());
        };

        if clip.in_sec == old_in && clip.out_sec == old_out {
            self.phase = TrimPhase::Idle;
            return Ok(ReleaseOutcome::Unchanged);
        }

        let pending = PendingTrim {
            clip_id,
            edge,
            old_in,
            old_out,
            new_in: clip.in_sec,
            new_out: clip.out_sec,
        };
        self.phase = TrimPhase::PendingConfirmation(pending.clone());
        Ok(ReleaseOutcome::PendingConfirmation(pending))
    }

    /// Accept the trim and close the gap it left. Returns the accepted trim
    /// and how many clips the reflow moved.
    pub fn confirm(&mut self, model: &mut TimelineModel) -> Result<(PendingTrim, usize)> {
        let TrimPhase::PendingConfirmation(pending) = &self.phase else {
            return Err(self.invalid("confirm"));
        };
        let pending = pending.clone();

        let moved = model.reflow();
        self.phase = TrimPhase::Idle;
        info!(
            clip = %pending.clip_id,
            edge = pending.edge_label(),
            trimmed = pending.trimmed_amount(),
            moved,
            "Trim confirmed"
        );
        Ok((pending, moved))
    }

    /// Restore the window captured at `begin`. Works mid-drag too, for
    /// gestures aborted by escape or the pointer leaving the window.
    pub fn cancel(&mut self, model: &mut TimelineModel) -> Result<()> {
        let (clip_id, old_in, old_out) = match &self.phase {
            TrimPhase::Dragging {
                clip_id,
                old_in,
                old_out,
                ..
            } => (*clip_id, *old_in, *old_out),
            TrimPhase::PendingConfirmation(pending) => {
                (pending.clip_id, pending.old_in, pending.old_out)
            }
            TrimPhase::Idle => return Err(self.invalid("cancel")),
        };

        self.phase = TrimPhase::Idle;
        model.set_trim_window(clip_id, old_in, old_out)?;
        info!(clip = %clip_id, "Trim cancelled");
        Ok(())
    }

    fn invalid(&self, action: &'static str) -> TrimError {
        TrimError::InvalidState {
            action,
            phase: self.phase.name(),
        }
    }
}

impl Default for TrimNegotiation {
    fn default() -> Self {
        Self::new()
    }
}
