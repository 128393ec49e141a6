//! ClipForge Timeline - Timeline data model
//!
//! Implements the editing core:
//! - Media catalog of imported assets
//! - Clips with trim windows placed on a single time axis
//! - Insert, trim, remove and gap-closing reflow
//! - Confirm/cancel negotiation around trim gestures
//! - Pure hit testing and library-to-timeline drag transfer
//! - Projection of the timeline into an encoder cut list

pub mod clip;
pub mod drag;
pub mod error;
pub mod export;
pub mod media;
pub mod model;
pub mod trim;

pub use clip::{TimelineClip, TrimEdge};
pub use drag::{DragTransfer, DropOutcome};
pub use error::{ExportError, TimelineError, TrimError};
pub use export::{CutEntry, ExportPlan, ExportRequest, ExportRequestBuilder, SkippedClip};
pub use hit_test::{ClipHit, HitZone, TimelineGeometry};
pub use media::{MediaAsset, MediaCatalog};
pub use model::TimelineModel;
pub use trim::{PendingTrim, ReleaseOutcome, TrimNegotiation, TrimPhase};
