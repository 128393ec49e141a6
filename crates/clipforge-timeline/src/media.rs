//! Imported media assets.

use clipforge_core::MediaId;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A probed source file. Only the transcript may change after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaAsset {
    /// Unique asset ID
    pub id: MediaId,
    /// Path to the media file
    pub source_path: PathBuf,
    /// Display name (file name)
    pub name: String,
    /// Source duration in seconds
    pub duration_sec: f64,
    pub width: u32,
    pub height: u32,
    pub size_bytes: u64,
    pub codec: Option<String>,
    pub fps: Option<f64>,
    /// Derived transcript text; no effect on timeline semantics.
    pub transcript: Option<String>,
}

impl MediaAsset {
    /// Create an asset from probed metadata. Negative or non-finite
    /// durations are stored as zero.
    pub fn new(
        source_path: impl Into<PathBuf>,
        duration_sec: f64,
        width: u32,
        height: u32,
        size_bytes: u64,
    ) -> Self {
        let source_path = source_path.into();
        let name = display_name(&source_path);
        let duration_sec = if duration_sec.is_finite() && duration_sec > 0.0 {
            duration_sec
        } else {
            0.0
        };
        Self {
            id: MediaId::new(),
            source_path,
            name,
            duration_sec,
            width,
            height,
            size_bytes,
            codec: None,
            fps: None,
            transcript: None,
        }
    }

    /// Resolution as `WxH`.
    pub fn resolution_label(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// The media library: assets in import order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaCatalog {
    assets: Vec<MediaAsset>,
}

impl MediaCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an asset. Returns its id.
    pub fn add(&mut self, asset: MediaAsset) -> MediaId {
        let id = asset.id;
        tracing::debug!(media = %id, name = %asset.name, "Media added to catalog");
        self.assets.push(asset);
        id
    }

    /// Look up an asset.
    pub fn get(&self, id: MediaId) -> Option<&MediaAsset> {
        self.assets.iter().find(|a| a.id == id)
    }

    /// Check whether an id resolves.
    pub fn contains(&self, id: MediaId) -> bool {
        self.get(id).is_some()
    }

    /// Remove an asset. Clips that referenced it become dangling.
    pub fn remove(&mut self, id: MediaId) -> Option<MediaAsset> {
        let index = self.assets.iter().position(|a| a.id == id)?;
        Some(self.assets.remove(index))
    }

    /// Attach transcript text to an asset. Returns false if the id is unknown.
    pub fn attach_transcript(&mut self, id: MediaId, text: impl Into<String>) -> bool {
        match self.assets.iter_mut().find(|a| a.id == id) {
            Some(asset) => {
                asset.transcript = Some(text.into());
                true
            }
            None => false,
        }
    }

    /// Iterate assets in import order.
    pub fn iter(&self) -> impl Iterator<Item = &MediaAsset> {
        self.assets.iter()
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_name_from_path() {
        let asset = MediaAsset::new("/videos/beach.mp4", 12.5, 1920, 1080, 1024);
        assert_eq!(asset.name, "beach.mp4");
        assert_eq!(asset.resolution_label(), "1920x1080");
    }

    #[test]
    fn test_invalid_duration_is_zero() {
        assert_eq!(MediaAsset::new("a.mp4", -1.0, 0, 0, 0).duration_sec, 0.0);
        assert_eq!(MediaAsset::new("a.mp4", f64::NAN, 0, 0, 0).duration_sec, 0.0);
    }

    #[test]
    fn test_catalog_add_get_remove() {
        let mut catalog = MediaCatalog::new();
        let id = catalog.add(MediaAsset::new("a.mp4", 5.0, 640, 480, 10));
        assert!(catalog.contains(id));
        assert_eq!(catalog.len(), 1);

        let removed = catalog.remove(id).unwrap();
        assert_eq!(removed.id, id);
        assert!(catalog.get(id).is_none());
        assert!(catalog.remove(id).is_none());
    }

    #[test]
    fn test_attach_transcript() {
        let mut catalog = MediaCatalog::new();
        let id = catalog.add(MediaAsset::new("a.mp4", 5.0, 640, 480, 10));
        assert!(catalog.attach_transcript(id, "hello world"));
        assert_eq!(catalog.get(id).unwrap().transcript.as_deref(), Some("hello world"));
        assert!(!catalog.attach_transcript(MediaId::new(), "nope"));
    }
}
