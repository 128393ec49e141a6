//! Integration tests for building and running exports.

use std::path::PathBuf;

use clipforge_app::{EditorError, EditorEvent};
use clipforge_core::CutOrder;
use clipforge_media::{ExportCancel, ExportStage, MediaError};
use clipforge_timeline::{ExportError, ExportRequestBuilder, TrimEdge};

use crate::support::{editor, import_all, RecordingEncoder};

#[test]
fn export_skips_dangling_clips_and_proceeds() {
    let mut editor = editor();
    let events = editor.subscribe();
    let media = import_all(&mut editor, &[("a.mp4", 3.0), ("b.mp4", 4.0)]);
    let a = editor.append_to_timeline(media[0]).unwrap();
    editor.append_to_timeline(media[1]).unwrap();
    editor.remove_media(media[0]).unwrap();

    let encoder = RecordingEncoder::default();
    let path = editor
        .export(&encoder, "out/final", &ExportCancel::new())
        .unwrap();

    assert_eq!(path, PathBuf::from("out/final.mp4"));
    let requests = encoder.requests.borrow();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].cuts.len(), 1);
    assert_eq!(requests[0].cuts[0].source_path, PathBuf::from("b.mp4"));

    let seen: Vec<EditorEvent> = events.try_iter().collect();
    let skipped = seen.iter().find_map(|e| match e {
        EditorEvent::ExportSkipped(skipped) => Some(skipped.clone()),
        _ => None,
    });
    assert_eq!(skipped.map(|s| s[0].clip_id), Some(a.id));
    assert!(seen.contains(&EditorEvent::ExportFinished(path.clone())));
}

#[test]
fn export_with_only_dangling_clips_fails() {
    let mut editor = editor();
    let media = import_all(&mut editor, &[("a.mp4", 3.0)]);
    editor.append_to_timeline(media[0]).unwrap();
    editor.remove_media(media[0]).unwrap();

    let result = editor.build_export("out.mp4");
    assert!(matches!(
        result,
        Err(EditorError::Export(ExportError::NoExportableClips { ref skipped })) if skipped.len() == 1
    ));
}

#[test]
fn empty_timeline_does_not_export() {
    let mut editor = editor();
    let encoder = RecordingEncoder::default();
    let result = editor.export(&encoder, "out.mp4", &ExportCancel::new());

    assert!(matches!(
        result,
        Err(EditorError::Export(ExportError::EmptyTimeline))
    ));
    assert!(encoder.requests.borrow().is_empty());
}

#[test]
fn cuts_follow_trim_windows_in_position_order() {
    let mut editor = editor();
    let media = import_all(&mut editor, &[("a.mp4", 10.0), ("b.mp4", 5.0)]);
    editor.insert_clip_at(media[0], 8.0, 0).unwrap();
    let b = editor.insert_clip_at(media[1], 0.0, 0).unwrap();

    editor.trim_begin(b.id, TrimEdge::Right).unwrap();
    editor.trim_drag(2.5).unwrap();
    editor.trim_release().unwrap();
    editor.trim_cancel().unwrap();
    editor.trim_begin(b.id, TrimEdge::Left).unwrap();
    editor.trim_drag(1.0).unwrap();
    editor.trim_release().unwrap();
    editor.trim_confirm().unwrap();

    let plan = editor.build_export("movie.MP4").unwrap();
    let cuts = &plan.request.cuts;
    assert_eq!(plan.request.output_path, PathBuf::from("movie.MP4"));
    assert_eq!(cuts[0].source_path, PathBuf::from("b.mp4"));
    assert_eq!((cuts[0].in_sec, cuts[0].out_sec), (1.0, 5.0));
    assert_eq!(cuts[1].source_path, PathBuf::from("a.mp4"));
    assert_eq!(plan.request.total_duration(), 14.0);
}

#[test]
fn sequence_order_keeps_insertion_order() {
    let mut editor = editor();
    let media = import_all(&mut editor, &[("a.mp4", 2.0), ("b.mp4", 2.0)]);
    editor.insert_clip_at(media[0], 8.0, 0).unwrap();
    editor.insert_clip_at(media[1], 0.0, 0).unwrap();

    let state = editor.state();
    let plan = ExportRequestBuilder::new(&editor.config().export)
        .with_order(CutOrder::Sequence)
        .build(&state.timeline, &state.catalog, "seq")
        .unwrap();

    let sources: Vec<PathBuf> = plan
        .request
        .cuts
        .iter()
        .map(|c| c.source_path.clone())
        .collect();
    assert_eq!(sources, vec![PathBuf::from("a.mp4"), PathBuf::from("b.mp4")]);
}

#[test]
fn progress_is_forwarded_and_cancel_stops_encoder() {
    let mut editor = editor();
    let events = editor.subscribe();
    let media = import_all(&mut editor, &[("a.mp4", 2.0), ("b.mp4", 2.0)]);
    editor.append_to_timeline(media[0]).unwrap();
    editor.append_to_timeline(media[1]).unwrap();

    let encoder = RecordingEncoder::default();
    editor
        .export(&encoder, "done.mp4", &ExportCancel::new())
        .unwrap();
    let stages: Vec<ExportStage> = events
        .try_iter()
        .filter_map(|e| match e {
            EditorEvent::ExportProgress(p) => Some(p.stage),
            _ => None,
        })
        .collect();
    assert_eq!(
        stages,
        vec![ExportStage::Rendering, ExportStage::Rendering, ExportStage::Done]
    );

    let cancel = ExportCancel::new();
    cancel.cancel();
    assert!(matches!(
        editor.export(&encoder, "never.mp4", &cancel),
        Err(EditorError::Media(MediaError::Cancelled))
    ));
}
