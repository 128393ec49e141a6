//! ClipForge editor controller.
//!
//! Holds the editor state (library, timeline, playback cursor, trim and
//! drag gestures, zoom) and exposes the operations a front end calls. Views
//! subscribe to [`EditorEvent`]s and redraw from them.

pub mod controller;
pub mod error;
pub mod events;

pub use controller::{EditorController, EditorState, PointerRelease};
pub use error::{EditorError, Result};
pub use events::{EditorEvent, EventBus};
