//! Dragging a library item onto the timeline.

use clipforge_core::{MediaId, Vec2};
use tracing::debug;

use crate::clip::TimelineClip;
use crate::error::TimelineError;
use crate::hit_test::TimelineGeometry;
use crate::media::MediaCatalog;
use crate::model::TimelineModel;

/// What a drop did.
#[derive(Debug, Clone, PartialEq)]
pub enum DropOutcome {
    Inserted(TimelineClip),
    /// Dropped outside the clip lane, or nothing was being dragged.
    Cancelled,
}

/// Library-to-timeline drag state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragTransfer {
    #[default]
    Idle,
    Dragging {
        media_id: MediaId,
        cursor: Vec2,
    },
}

impl DragTransfer {
    pub fn new() -> Self {
        Self::Idle
    }

    /// Pick up a library item. Replaces any drag already in flight.
    pub fn start(&mut self, media_id: MediaId, cursor: Vec2) {
        debug!(media = %media_id, "Drag started");
        *self = Self::Dragging { media_id, cursor };
    }

    /// Track the pointer. Returns false when nothing is being dragged.
    pub fn move_to(&mut self, point: Vec2) -> bool {
        match self {
            Self::Dragging { cursor, .. } => {
                *cursor = point;
                true
            }
            Self::Idle => false,
        }
    }

    /// Release over the canvas. Inside the clip lane the media is inserted
    /// at the time under the pointer; anywhere else the drag is dropped.
    pub fn drop_at(
        &mut self,
        model: &mut TimelineModel,
        catalog: &MediaCatalog,
        geometry: &TimelineGeometry,
        point: Vec2,
    ) -> Result<DropOutcome, TimelineError> {
        let Self::Dragging { media_id, .. } = std::mem::take(self) else {
            return Ok(DropOutcome::Cancelled);
        };

        if !geometry.in_track(point) || point.x < 0.0 {
            debug!(media = %media_id, "Drop outside timeline, ignored");
            return Ok(DropOutcome::Cancelled);
        }

        let start = geometry.time_at_x(point.x);
        let clip = model.insert_at(catalog, media_id, start, 0)?;
        Ok(DropOutcome::Inserted(clip))
    }

    pub fn cancel(&mut self) {
        *self = Self::Idle;
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self, Self::Dragging { .. })
    }

    pub fn media_id(&self) -> Option<MediaId> {
        match self {
            Self::Dragging { media_id, .. } => Some(*media_id),
            Self::Idle => None,
        }
    }

    pub fn cursor(&self) -> Option<Vec2> {
        match self {
            Self::Dragging { cursor, .. } => Some(*cursor),
            Self::Idle => None,
        }
    }
}
