//! Projection of the timeline into an encoder cut list.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use clipforge_core::{ClipId, CutOrder, ExportSettings, MediaId};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::clip::TimelineClip;
use crate::error::ExportError;
use crate::media::MediaCatalog;
use crate::model::TimelineModel;

/// One segment of one source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CutEntry {
    pub source_path: PathBuf,
    pub in_sec: f64,
    pub out_sec: f64,
}

impl CutEntry {
    pub fn duration(&self) -> f64 {
        self.out_sec - self.in_sec
    }
}

/// Everything the encoder needs: cuts in output order and a destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRequest {
    pub cuts: Vec<CutEntry>,
    pub output_path: PathBuf,
}

impl ExportRequest {
    /// Length of the rendered output.
    pub fn total_duration(&self) -> f64 {
        self.cuts.iter().map(CutEntry::duration).sum()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// A clip left out of the export because its media no longer resolves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedClip {
    pub clip_id: ClipId,
    pub media_id: MediaId,
}

/// A built request plus the warnings gathered while building it.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportPlan {
    pub request: ExportRequest,
    pub skipped: Vec<SkippedClip>,
}

/// Builds export requests from a timeline.
#[derive(Debug, Clone)]
pub struct ExportRequestBuilder {
    order: CutOrder,
    extension: String,
}

impl ExportRequestBuilder {
    pub fn new(settings: &ExportSettings) -> Self {
        Self {
            order: settings.cut_order,
            extension: settings.extension.clone(),
        }
    }

    pub fn with_order(mut self, order: CutOrder) -> Self {
        self.order = order;
        self
    }

    pub fn order(&self) -> CutOrder {
        self.order
    }

    /// Collect the cut list for `model`. Clips with missing media are
    /// skipped with a warning; the export fails only when nothing is left.
    pub fn build(
        &self,
        model: &TimelineModel,
        catalog: &MediaCatalog,
        output_path: impl AsRef<Path>,
    ) -> Result<ExportPlan, ExportError> {
        if model.is_empty() {
            return Err(ExportError::EmptyTimeline);
        }

        let mut ordered: Vec<&TimelineClip> = model.clips().iter().collect();
        if self.order == CutOrder::Position {
            ordered.sort_by(|a, b| a.start_time_sec.total_cmp(&b.start_time_sec));
        }

        let mut cuts = Vec::with_capacity(ordered.len());
        let mut skipped = Vec::new();
        for clip in ordered {
            match catalog.get(clip.media_id) {
                Some(media) => cuts.push(CutEntry {
                    source_path: media.source_path.clone(),
                    in_sec: clip.in_sec,
                    out_sec: clip.out_sec,
                }),
                None => {
                    warn!(clip = %clip.id, media = %clip.media_id, "Skipping clip with missing media");
                    skipped.push(SkippedClip {
                        clip_id: clip.id,
                        media_id: clip.media_id,
                    });
                }
            }
        }

        if cuts.is_empty() {
            return Err(ExportError::NoExportableClips { skipped });
        }

        let output_path = with_extension(output_path.as_ref(), &self.extension);
        info!(
            cuts = cuts.len(),
            skipped = skipped.len(),
            output = %output_path.display(),
            "Export request built"
        );
        Ok(ExportPlan {
            request: ExportRequest { cuts, output_path },
            skipped,
        })
    }
}

impl Default for ExportRequestBuilder {
    fn default() -> Self {
        Self::new(&ExportSettings::default())
    }
}

/// Append `.ext` unless the path already carries it.
fn with_extension(path: &Path, extension: &str) -> PathBuf {
    let matches = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(extension));
    if matches || extension.is_empty() {
        return path.to_path_buf();
    }
    let mut raw = OsString::from(path.as_os_str());
    raw.push(".");
    raw.push(extension);
    PathBuf::from(raw)
}
