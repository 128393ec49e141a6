//! Change notifications for views observing the editor.

use std::path::PathBuf;

use clipforge_core::{ClipId, MediaId};
use clipforge_media::ExportProgress;
use clipforge_timeline::{PendingTrim, SkippedClip};
use crossbeam_channel::{unbounded, Receiver, Sender};
use tracing::debug;

/// Something observable changed in the editor state.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    MediaImported { media_id: MediaId, name: String },
    /// Library removal; `dangling` lists clips that lost their media.
    MediaRemoved { media_id: MediaId, dangling: Vec<ClipId> },
    ClipInserted { clip_id: ClipId, start_time_sec: f64 },
    ClipRemoved { clip_id: ClipId },
    /// Live trim update during a gesture.
    ClipTrimmed { clip_id: ClipId, in_sec: f64, out_sec: f64 },
    TrimPending(PendingTrim),
    TrimConfirmed { clip_id: ClipId },
    TrimCancelled { clip_id: ClipId },
    TimelineReflowed { moved: usize },
    SelectionChanged(Option<ClipId>),
    PlayheadMoved(f64),
    PlaybackChanged { playing: bool },
    ClipActivated { index: usize, clip_id: Option<ClipId> },
    ZoomChanged(f32),
    DragChanged { media_id: Option<MediaId> },
    ExportSkipped(Vec<SkippedClip>),
    ExportProgress(ExportProgress),
    ExportFinished(PathBuf),
}

/// Fan-out of editor events to any number of subscribers.
#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Vec<Sender<EditorEvent>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new observer.
    pub fn subscribe(&mut self) -> Receiver<EditorEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    /// Deliver `event` to every live subscriber. Subscribers whose receiver
    /// was dropped are removed.
    pub fn emit(&mut self, event: EditorEvent) {
        let before = self.subscribers.len();
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
        let pruned = before - self.subscribers.len();
        if pruned > 0 {
            debug!(pruned, "Dropped disconnected event subscribers");
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}
