//! Integration tests for playback across clip boundaries.

use clipforge_app::{EditorError, EditorEvent};
use clipforge_playback::{EngineCall, PlaybackError, TickOutcome};
use clipforge_timeline::TrimEdge;

use crate::support::{editor, import_all};

#[test]
fn crossing_into_trimmed_clip_seeks_its_in_point() {
    let mut editor = editor();
    let media = import_all(&mut editor, &[("a.mp4", 3.0), ("b.mp4", 4.0)]);
    editor.append_to_timeline(media[0]).unwrap();
    let b = editor.append_to_timeline(media[1]).unwrap();

    editor.trim_begin(b.id, TrimEdge::Left).unwrap();
    editor.trim_drag(1.0).unwrap();
    editor.trim_release().unwrap();
    editor.trim_confirm().unwrap();
    assert_eq!(editor.state().timeline.get(b.id).unwrap().start_time_sec, 3.0);

    assert!(editor.play().unwrap());
    editor.engine_mut().advance(3.0);
    let outcome = editor.tick().unwrap();

    assert_eq!(outcome, TickOutcome::Crossed { index: 1, playhead: 3.0 });
    assert_eq!(editor.state().cursor.active_index(), 1);
    assert_eq!(editor.state().cursor.active_clip(), Some(b.id));
    assert_eq!(editor.engine().last_seek(), Some(1.0));
    assert_eq!(editor.playhead(), 3.0);

    editor.engine_mut().advance(0.5);
    assert_eq!(editor.tick().unwrap(), TickOutcome::Advanced { playhead: 3.5 });
}

#[test]
fn playback_skips_clips_with_removed_media() {
    let mut editor = editor();
    let media = import_all(
        &mut editor,
        &[("a.mp4", 2.0), ("b.mp4", 2.0), ("c.mp4", 2.0)],
    );
    for id in &media {
        editor.append_to_timeline(*id).unwrap();
    }
    editor.remove_media(media[1]).unwrap();

    editor.play().unwrap();
    editor.engine_mut().advance(2.0);

    assert_eq!(
        editor.tick().unwrap(),
        TickOutcome::Crossed { index: 2, playhead: 4.0 }
    );
    assert_eq!(editor.engine().source(), Some(std::path::Path::new("c.mp4")));
}

#[test]
fn playing_from_a_gap_starts_at_next_clip() {
    let mut editor = editor();
    let media = import_all(&mut editor, &[("a.mp4", 2.0), ("b.mp4", 2.0)]);
    editor.insert_clip_at(media[0], 0.0, 0).unwrap();
    editor.insert_clip_at(media[1], 5.0, 0).unwrap();

    editor.seek(3.0).unwrap();
    assert!(editor.state().cursor.is_parked());

    editor.play().unwrap();
    assert_eq!(editor.playhead(), 5.0);
    assert_eq!(editor.state().cursor.active_index(), 1);
}

#[test]
fn finishing_then_playing_restarts_from_first_clip() {
    let mut editor = editor();
    let events = editor.subscribe();
    let media = import_all(&mut editor, &[("a.mp4", 1.0)]);
    editor.append_to_timeline(media[0]).unwrap();

    editor.play().unwrap();
    editor.engine_mut().advance(1.0);
    assert_eq!(editor.tick().unwrap(), TickOutcome::Finished);
    assert!(!editor.is_playing());

    editor.play().unwrap();
    assert_eq!(editor.playhead(), 0.0);
    assert_eq!(editor.engine().last_seek(), Some(0.0));

    let seen: Vec<EditorEvent> = events.try_iter().collect();
    let stops = seen
        .iter()
        .filter(|e| **e == EditorEvent::PlaybackChanged { playing: false })
        .count();
    assert_eq!(stops, 1);
}

#[test]
fn engine_failure_leaves_playhead_in_place() {
    let mut editor = editor();
    let media = import_all(&mut editor, &[("a.mp4", 2.0), ("b.mp4", 2.0)]);
    editor.append_to_timeline(media[0]).unwrap();
    editor.append_to_timeline(media[1]).unwrap();
    editor.engine_mut().fail_loads_of("b.mp4");

    editor.play().unwrap();
    editor.engine_mut().advance(1.0);
    editor.tick().unwrap();
    editor.engine_mut().advance(1.0);

    assert!(matches!(
        editor.tick(),
        Err(EditorError::Playback(PlaybackError::Engine(_)))
    ));
    assert_eq!(editor.playhead(), 1.0);
    assert_eq!(editor.state().cursor.active_index(), 0);
}

#[test]
fn seek_while_playing_keeps_playing() {
    let mut editor = editor();
    let media = import_all(&mut editor, &[("a.mp4", 2.0), ("b.mp4", 2.0)]);
    editor.append_to_timeline(media[0]).unwrap();
    editor.append_to_timeline(media[1]).unwrap();

    editor.play().unwrap();
    editor.engine_mut().take_calls();
    editor.seek(3.5).unwrap();

    assert!(editor.is_playing());
    assert_eq!(
        editor.engine().calls(),
        &[
            EngineCall::Load("b.mp4".into()),
            EngineCall::Seek(1.5),
            EngineCall::Play,
        ]
    );
}

#[test]
fn stop_rewinds() {
    let mut editor = editor();
    let media = import_all(&mut editor, &[("a.mp4", 2.0)]);
    editor.append_to_timeline(media[0]).unwrap();

    editor.play().unwrap();
    editor.engine_mut().advance(1.0);
    editor.tick().unwrap();
    editor.stop().unwrap();

    assert_eq!(editor.playhead(), 0.0);
    assert!(!editor.is_playing());
    assert_eq!(editor.state().cursor.active_index(), 0);
}
