//! Integration tests for timeline editing through the controller.

use clipforge_app::{EditorError, EditorEvent, PointerRelease};
use clipforge_core::Vec2;
use clipforge_timeline::{ReleaseOutcome, TrimEdge, TrimError};
use proptest::prelude::*;

use crate::support::{editor, import_all};

// ── Placement ──────────────────────────────────────────────────

#[test]
fn append_places_after_previous_clip() {
    let mut editor = editor();
    let media = import_all(&mut editor, &[("x.mp4", 5.0), ("y.mp4", 3.0)]);

    editor.append_to_timeline(media[0]).unwrap();
    let y = editor.append_to_timeline(media[1]).unwrap();

    assert_eq!(y.start_time_sec, 5.0);
    assert_eq!((y.in_sec, y.out_sec), (0.0, 3.0));
    assert_eq!(editor.timeline_duration(), 8.0);
}

#[test]
fn failed_import_adds_nothing() {
    let mut editor = editor();
    let inspector = crate::support::TableInspector::new(&[]);
    let result = editor.import_media(&inspector, std::path::Path::new("missing.mp4"));

    assert!(matches!(result, Err(EditorError::Media(_))));
    assert!(editor.state().catalog.is_empty());
}

#[test]
fn inserts_at_explicit_positions_may_leave_gaps() {
    let mut editor = editor();
    let media = import_all(&mut editor, &[("a.mp4", 2.0)]);

    editor.insert_clip_at(media[0], 10.0, 0).unwrap();
    editor.insert_clip_at(media[0], -4.0, 0).unwrap();

    let starts: Vec<f64> = editor.clips().iter().map(|c| c.start_time_sec).collect();
    assert_eq!(starts, vec![10.0, 0.0]);
    assert_eq!(editor.timeline_duration(), 12.0);
}

// ── Reflow ─────────────────────────────────────────────────────

#[test]
fn reflow_packs_from_zero_in_position_order() {
    let mut editor = editor();
    let media = import_all(&mut editor, &[("a.mp4", 4.0), ("b.mp4", 2.0)]);

    let late = editor.insert_clip_at(media[0], 20.0, 0).unwrap();
    let early = editor.insert_clip_at(media[1], 3.0, 0).unwrap();

    assert_eq!(editor.reflow(), 2);
    let timeline = &editor.state().timeline;
    assert_eq!(timeline.get(early.id).unwrap().start_time_sec, 0.0);
    assert_eq!(timeline.get(late.id).unwrap().start_time_sec, 2.0);
    assert_eq!(editor.reflow(), 0);
}

proptest! {
    #[test]
    fn reflow_is_idempotent_and_exact(
        starts in proptest::collection::vec(0.0f64..500.0, 1..20),
        durations in proptest::collection::vec(0.2f64..30.0, 20),
    ) {
        let mut editor = editor();
        let files: Vec<(String, f64)> = durations
            .iter()
            .enumerate()
            .map(|(i, d)| (format!("m{i}.mp4"), *d))
            .collect();
        let files: Vec<(&str, f64)> = files.iter().map(|(p, d)| (p.as_str(), *d)).collect();
        let media = import_all(&mut editor, &files);

        for (i, start) in starts.iter().enumerate() {
            editor.insert_clip_at(media[i], *start, 0).unwrap();
        }

        editor.reflow();
        let first: Vec<f64> = editor.clips().iter().map(|c| c.start_time_sec).collect();
        editor.reflow();
        let second: Vec<f64> = editor.clips().iter().map(|c| c.start_time_sec).collect();
        prop_assert_eq!(&first, &second);

        let clips = editor.clips();
        prop_assert_eq!(clips[0].start_time_sec, 0.0);
        for pair in clips.windows(2) {
            prop_assert_eq!(
                pair[1].start_time_sec,
                pair[0].start_time_sec + (pair[0].out_sec - pair[0].in_sec)
            );
        }
    }

    #[test]
    fn extreme_trims_stay_in_bounds(boundary in -1e6f64..1e6, left in any::<bool>()) {
        let mut editor = editor();
        let media = import_all(&mut editor, &[("a.mp4", 10.0)]);
        let clip = editor.append_to_timeline(media[0]).unwrap();
        let edge = if left { TrimEdge::Left } else { TrimEdge::Right };

        editor.trim_begin(clip.id, edge).unwrap();
        editor.trim_drag(boundary).unwrap();

        let min = editor.config().min_clip_duration;
        let trimmed = editor.state().timeline.get(clip.id).unwrap();
        prop_assert!(trimmed.out_sec - trimmed.in_sec >= min - 1e-9);
        prop_assert!(trimmed.in_sec >= 0.0);
        prop_assert!(trimmed.out_sec <= 10.0);
    }
}

// ── Trim negotiation ───────────────────────────────────────────

#[test]
fn cancel_restores_exact_window() {
    let mut editor = editor();
    let media = import_all(&mut editor, &[("a.mp4", 10.0)]);
    let clip = editor.append_to_timeline(media[0]).unwrap();

    // Establish (2.0, 8.0) through two confirmed trims.
    editor.trim_begin(clip.id, TrimEdge::Left).unwrap();
    editor.trim_drag(2.0).unwrap();
    editor.trim_release().unwrap();
    editor.trim_confirm().unwrap();
    editor.trim_begin(clip.id, TrimEdge::Right).unwrap();
    editor.trim_drag(8.0).unwrap();
    editor.trim_release().unwrap();
    editor.trim_confirm().unwrap();

    editor.trim_begin(clip.id, TrimEdge::Left).unwrap();
    editor.trim_drag(4.0).unwrap();
    assert!(matches!(
        editor.trim_release().unwrap(),
        ReleaseOutcome::PendingConfirmation(_)
    ));
    editor.trim_cancel().unwrap();

    let restored = editor.state().timeline.get(clip.id).unwrap();
    assert_eq!((restored.in_sec, restored.out_sec), (2.0, 8.0));
}

#[test]
fn confirm_reflows_following_clips() {
    let mut editor = editor();
    let events = editor.subscribe();
    let media = import_all(&mut editor, &[("a.mp4", 10.0), ("b.mp4", 5.0)]);
    let a = editor.append_to_timeline(media[0]).unwrap();
    let b = editor.append_to_timeline(media[1]).unwrap();

    editor.trim_begin(a.id, TrimEdge::Right).unwrap();
    editor.trim_drag(6.0).unwrap();
    editor.trim_release().unwrap();
    let pending = editor.trim_confirm().unwrap();

    assert_eq!(pending.new_out, 6.0);
    assert_eq!(editor.state().timeline.get(b.id).unwrap().start_time_sec, 6.0);
    let seen: Vec<EditorEvent> = events.try_iter().collect();
    assert!(seen.contains(&EditorEvent::TrimConfirmed { clip_id: a.id }));
    assert!(seen.contains(&EditorEvent::TimelineReflowed { moved: 1 }));
}

#[test]
fn second_gesture_rejected_while_pending() {
    let mut editor = editor();
    let media = import_all(&mut editor, &[("a.mp4", 10.0), ("b.mp4", 5.0)]);
    let a = editor.append_to_timeline(media[0]).unwrap();
    let b = editor.append_to_timeline(media[1]).unwrap();

    editor.trim_begin(a.id, TrimEdge::Left).unwrap();
    editor.trim_drag(1.0).unwrap();
    editor.trim_release().unwrap();

    assert!(matches!(
        editor.trim_begin(b.id, TrimEdge::Left),
        Err(EditorError::Trim(TrimError::GestureInProgress(id))) if id == a.id
    ));
    editor.trim_confirm().unwrap();
    editor.trim_begin(b.id, TrimEdge::Left).unwrap();
}

#[test]
fn pointer_gesture_on_left_handle() {
    let mut editor = editor();
    let media = import_all(&mut editor, &[("a.mp4", 10.0)]);
    let clip = editor.append_to_timeline(media[0]).unwrap();
    let y = editor.geometry().track_top + 10.0;

    editor.click_timeline(Vec2::new(2.0, y)).unwrap();
    editor.pointer_move(Vec2::new(100.0, y)).unwrap();
    let release = editor.pointer_up(Vec2::new(100.0, y)).unwrap();

    let PointerRelease::Trim(ReleaseOutcome::PendingConfirmation(pending)) = release else {
        panic!("expected a pending trim, got {release:?}");
    };
    assert_eq!(pending.new_in, 2.0);
    assert_eq!(
        editor.trim_prompt().unwrap(),
        "Trim 2.00s from the beginning of \"a.mp4\"? Duration 10.00s -> 8.00s"
    );
    editor.trim_cancel().unwrap();
    assert_eq!(editor.state().timeline.get(clip.id).unwrap().in_sec, 0.0);
}

// ── Selection & removal ────────────────────────────────────────

#[test]
fn clicking_empty_canvas_clears_selection_and_seeks() {
    let mut editor = editor();
    let media = import_all(&mut editor, &[("a.mp4", 4.0)]);
    editor.append_to_timeline(media[0]).unwrap();
    let y = editor.geometry().track_top - 20.0;

    assert!(editor.click_timeline(Vec2::new(100.0, y)).unwrap().is_none());
    assert_eq!(editor.state().timeline.selected(), None);
    assert_eq!(editor.playhead(), 2.0);
}

#[test]
fn removing_selected_clip_clears_selection() {
    let mut editor = editor();
    let events = editor.subscribe();
    let media = import_all(&mut editor, &[("a.mp4", 4.0)]);
    let clip = editor.append_to_timeline(media[0]).unwrap();

    editor.remove_selected().unwrap();

    assert!(editor.clips().is_empty());
    assert_eq!(editor.state().timeline.selected(), None);
    let seen: Vec<EditorEvent> = events.try_iter().collect();
    assert!(seen.contains(&EditorEvent::ClipRemoved { clip_id: clip.id }));
    assert_eq!(seen.last(), Some(&EditorEvent::SelectionChanged(None)));
}
