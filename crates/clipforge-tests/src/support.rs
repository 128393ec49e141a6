//! Test doubles shared by the integration tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use clipforge_app::EditorController;
use clipforge_core::{EditorConfig, MediaId};
use clipforge_media::{
    Encoder, ExportCancel, ExportProgress, ExportStage, MediaError, MediaInspector, ProbeReport,
};
use clipforge_playback::SimulatedEngine;
use clipforge_timeline::ExportRequest;

/// Inspector answering from a fixed table of durations.
#[derive(Default)]
pub struct TableInspector {
    durations: HashMap<PathBuf, f64>,
}

impl TableInspector {
    pub fn new(files: &[(&str, f64)]) -> Self {
        Self {
            durations: files
                .iter()
                .map(|(path, d)| (PathBuf::from(path), *d))
                .collect(),
        }
    }
}

impl MediaInspector for TableInspector {
    fn inspect(&self, path: &Path) -> Result<ProbeReport, MediaError> {
        let duration_sec = *self
            .durations
            .get(path)
            .ok_or_else(|| MediaError::NotFound(path.to_path_buf()))?;
        Ok(ProbeReport {
            path: path.to_path_buf(),
            duration_sec,
            width: 1920,
            height: 1080,
            size_bytes: 1024,
            codec: Some("h264".into()),
            fps: Some(30.0),
        })
    }
}

/// Encoder that records requests instead of running ffmpeg.
#[derive(Default)]
pub struct RecordingEncoder {
    pub requests: RefCell<Vec<ExportRequest>>,
}

impl Encoder for RecordingEncoder {
    fn encode(
        &self,
        request: &ExportRequest,
        cancel: &ExportCancel,
        on_progress: &mut dyn FnMut(ExportProgress),
    ) -> Result<PathBuf, MediaError> {
        let total = request.cuts.len();
        for completed in 1..=total {
            if cancel.is_cancelled() {
                return Err(MediaError::Cancelled);
            }
            on_progress(ExportProgress {
                stage: ExportStage::Rendering,
                completed,
                total,
            });
        }
        on_progress(ExportProgress {
            stage: ExportStage::Done,
            completed: total,
            total,
        });
        self.requests.borrow_mut().push(request.clone());
        Ok(request.output_path.clone())
    }
}

pub fn editor() -> EditorController<SimulatedEngine> {
    EditorController::new(EditorConfig::default(), SimulatedEngine::new())
}

/// Import each file through `inspector` and return the media ids in order.
pub fn import_all(
    editor: &mut EditorController<SimulatedEngine>,
    files: &[(&str, f64)],
) -> Vec<MediaId> {
    let inspector = TableInspector::new(files);
    files
        .iter()
        .map(|(path, _)| editor.import_media(&inspector, Path::new(path)).unwrap())
        .collect()
}
