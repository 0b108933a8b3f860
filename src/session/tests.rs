use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;
use rstest::rstest;

use super::testing::{Call, MockBackend, MockSink, Spy};
use super::*;
use crate::model::test_track;

fn url(name: &str) -> String {
    format!("https://p.scdn.co/mp3-preview/{}", name.to_lowercase())
}

fn playlist(names: &[&str]) -> Playlist {
    Playlist::new(
        names
            .iter()
            .map(|name| test_track(name, Some(url(name).as_str())))
            .collect(),
    )
    .unwrap()
}

fn session() -> (PlaybackSession<MockBackend>, Spy) {
    let (backend, spy) = MockBackend::new();
    (PlaybackSession::new(backend), spy)
}

fn playing_session(names: &[&str], index: usize) -> (PlaybackSession<MockBackend>, Spy) {
    let (mut session, spy) = session();
    session.start(playlist(names), index).unwrap();
    session.on_prepared();
    spy.clear_calls();
    (session, spy)
}

#[test]
fn starts_in_initializing_without_resources() {
    let (session, spy) = session();
    assert_eq!(session.state(), InternalState::Initializing);
    assert_eq!(session.external_state(), PlaybackState::Playing);
    assert!(!session.is_active());
    assert_eq!(session.current_track(), None);
    assert!(spy.calls().is_empty());
}

#[test]
fn start_allocates_then_prepares() {
    let (mut session, spy) = session();
    session.start(playlist(&["A", "B"]), 1).unwrap();

    assert_eq!(session.state(), InternalState::Preparing);
    assert_eq!(session.cursor(), Some(1));
    assert_eq!(
        spy.calls(),
        vec![
            Call::CreateDecoder,
            Call::CreateLock,
            Call::SetSource(url("B")),
            Call::Acquire,
            Call::Prepare,
        ]
    );
    assert!(session.keep_alive_held());
}

#[rstest]
#[case(&["A"], 0)]
#[case(&["A", "B", "C"], 0)]
#[case(&["A", "B", "C"], 2)]
fn start_then_prepared_is_playing(#[case] names: &[&str], #[case] index: usize) {
    let (mut session, _spy) = session();
    session.start(playlist(names), index).unwrap();
    session.on_prepared();

    assert_eq!(session.state(), InternalState::Playing);
    assert_eq!(session.external_state(), PlaybackState::Playing);
    assert_eq!(
        session.current_track().map(|t| t.track_name.as_str()),
        Some(names[index])
    );
}

#[test]
fn start_rejects_out_of_range_index() {
    let (mut session, spy) = session();
    let result = session.start(playlist(&["A", "B"]), 2);

    assert_eq!(result, Err(SessionError::IndexOutOfRange { index: 2, len: 2 }));
    assert_eq!(session.state(), InternalState::Initializing);
    assert!(spy.calls().is_empty());
}

#[test]
fn start_replaces_previous_playlist() {
    let (mut session, spy) = playing_session(&["A", "B"], 0);
    session.start(playlist(&["X", "Y", "Z"]), 2).unwrap();

    assert_eq!(session.state(), InternalState::Preparing);
    assert_eq!(session.current_track().unwrap().track_name, "Z");
    assert_eq!(
        spy.calls(),
        vec![
            Call::ReleaseLock,
            Call::Reset,
            Call::SetSource(url("Z")),
            Call::Acquire,
            Call::Prepare,
        ]
    );
}

#[rstest]
#[case(None)]
#[case(Some(""))]
#[case(Some("not a url"))]
fn invalid_audio_url_goes_straight_to_error(#[case] audio_url: Option<&str>) {
    let (mut session, spy) = session();
    let tracks = Playlist::new(vec![test_track("A", audio_url)]).unwrap();
    session.start(tracks, 0).unwrap();

    assert_eq!(session.state(), InternalState::Error);
    assert_eq!(session.external_state(), PlaybackState::Error);
    assert!(!spy.lock_held());
    let calls = spy.calls();
    assert!(!calls.contains(&Call::Acquire));
    assert!(!calls.contains(&Call::Prepare));
    assert!(matches!(
        session.last_error(),
        Some(SessionError::InvalidAudioSource { .. })
    ));
}

#[test]
fn decoder_rejecting_source_is_an_invalid_source() {
    let (mut session, spy) = session();
    spy.reject_source(&url("A"));
    session.start(playlist(&["A"]), 0).unwrap();

    assert_eq!(session.state(), InternalState::Error);
    assert!(!spy.lock_held());
    assert!(!spy.calls().contains(&Call::Prepare));
}

#[test]
fn next_and_previous_wrap() {
    let (mut session, _spy) = playing_session(&["A", "B", "C"], 2);
    session.next();
    assert_eq!(session.cursor(), Some(0));
    session.previous();
    assert_eq!(session.cursor(), Some(2));
}

#[test]
fn next_and_previous_are_inverse() {
    for start in 0..3 {
        let (mut session, _spy) = playing_session(&["A", "B", "C"], start);
        session.next();
        session.previous();
        assert_eq!(session.cursor(), Some(start));
        session.previous();
        session.next();
        assert_eq!(session.cursor(), Some(start));
    }
}

#[test]
fn next_from_playing_releases_before_reset() {
    let (mut session, spy) = playing_session(&["A", "B"], 0);
    session.next();

    assert_eq!(session.state(), InternalState::Preparing);
    assert_eq!(
        spy.calls(),
        vec![
            Call::ReleaseLock,
            Call::Reset,
            Call::SetSource(url("B")),
            Call::Acquire,
            Call::Prepare,
        ]
    );
}

#[test]
fn transport_without_playlist_is_noop() {
    let (mut session, spy) = session();
    session.next();
    session.previous();
    session.seek(1_000);
    assert_eq!(session.toggle_pause_play(), Ok(()));

    assert_eq!(session.state(), InternalState::Initializing);
    assert_eq!(session.cursor(), None);
    assert!(spy.calls().is_empty());
}

#[rstest]
#[case(0, 1)]
#[case(1, 2)]
#[case(2, 0)]
fn completion_advances_with_wrap(#[case] from: usize, #[case] to: usize) {
    let (mut session, spy) = playing_session(&["A", "B", "C"], from);
    session.on_playback_completed();

    assert_eq!(session.cursor(), Some(to));
    assert_eq!(session.state(), InternalState::Preparing);
    assert!(spy.calls().contains(&Call::SetSource(url(["A", "B", "C"][to]))));
}

#[test]
fn completion_onto_bad_track_waits_in_error() {
    let (mut session, spy) = session();
    let tracks = Playlist::new(vec![
        test_track("A", Some(url("A").as_str())),
        test_track("B", None),
        test_track("C", Some(url("C").as_str())),
    ])
    .unwrap();
    session.start(tracks, 0).unwrap();
    session.on_prepared();
    session.on_playback_completed();

    assert_eq!(session.cursor(), Some(1));
    assert_eq!(session.state(), InternalState::Error);
    assert!(!spy.lock_held());
}

#[test]
fn stale_callbacks_are_ignored() {
    let (mut session, spy) = playing_session(&["A", "B"], 0);
    session.on_prepared();
    assert!(spy.calls().is_empty());

    session.pause().unwrap();
    spy.clear_calls();
    session.on_playback_completed();
    assert_eq!(session.state(), InternalState::Paused);
    assert_eq!(session.cursor(), Some(0));
    assert!(spy.calls().is_empty());
}

#[test]
fn playback_error_releases_and_resets() {
    let (mut session, spy) = playing_session(&["A", "B"], 0);
    assert!(session.on_playback_error(1, -1004));

    assert_eq!(session.state(), InternalState::Error);
    assert_eq!(session.cursor(), Some(0));
    assert!(!spy.lock_held());
    assert_eq!(spy.calls(), vec![Call::ReleaseLock, Call::Reset]);
    assert_eq!(
        session.last_error(),
        Some(&SessionError::PlaybackFailure {
            what: 1,
            extra: -1004
        })
    );
}

#[test]
fn pause_and_resume_toggle_lock() {
    let (mut session, spy) = playing_session(&["A"], 0);

    session.pause().unwrap();
    assert_eq!(session.state(), InternalState::Paused);
    assert_eq!(session.external_state(), PlaybackState::Paused);
    assert!(!spy.lock_held());

    session.resume().unwrap();
    assert_eq!(session.state(), InternalState::Playing);
    assert!(spy.lock_held());

    assert_eq!(
        spy.calls(),
        vec![Call::Pause, Call::ReleaseLock, Call::Acquire, Call::Start]
    );
}

#[test]
fn pause_outside_playing_is_rejected() {
    let (mut session, spy) = session();
    session.start(playlist(&["A"]), 0).unwrap();
    spy.clear_calls();

    let result = session.pause();
    assert_eq!(
        result,
        Err(SessionError::InvalidState {
            operation: "pause",
            state: InternalState::Preparing
        })
    );
    assert_eq!(session.state(), InternalState::Preparing);
    assert!(spy.lock_held());
    assert!(spy.calls().is_empty());
}

#[test]
fn resume_outside_paused_is_rejected() {
    let (mut session, spy) = playing_session(&["A"], 0);
    assert!(matches!(
        session.resume(),
        Err(SessionError::InvalidState {
            operation: "resume",
            ..
        })
    ));
    assert_eq!(session.state(), InternalState::Playing);
    assert!(spy.calls().is_empty());
}

#[test]
fn toggle_dispatches_by_state() {
    let (mut session, _spy) = playing_session(&["A"], 0);
    session.toggle_pause_play().unwrap();
    assert_eq!(session.state(), InternalState::Paused);
    session.toggle_pause_play().unwrap();
    assert_eq!(session.state(), InternalState::Playing);

    session.on_playback_error(1, 0);
    session.toggle_pause_play().unwrap();
    assert_eq!(session.state(), InternalState::Error);
}

#[test]
fn seek_only_with_timeline() {
    let (mut session, spy) = session();
    session.start(playlist(&["A"]), 0).unwrap();
    session.seek(5_000);
    assert!(!spy.calls().contains(&Call::Seek(5_000)));

    session.on_prepared();
    session.seek(5_000);
    session.pause().unwrap();
    session.seek(7_000);
    let calls = spy.calls();
    assert!(calls.contains(&Call::Seek(5_000)));
    assert!(calls.contains(&Call::Seek(7_000)));
    assert_eq!(session.state(), InternalState::Paused);
}

#[test]
fn timeline_queries_are_zero_until_prepared() {
    let (mut session, spy) = session();
    spy.set_timeline(12_000, 30_000);
    session.start(playlist(&["A"]), 0).unwrap();
    assert_eq!(session.current_position_ms(), 0);
    assert_eq!(session.duration_ms(), 0);

    session.on_prepared();
    assert_eq!(session.current_position_ms(), 12_000);
    assert_eq!(session.duration_ms(), 30_000);

    session.on_playback_error(1, 0);
    assert_eq!(session.current_position_ms(), 0);
    assert_eq!(session.duration_ms(), 0);
}

#[test]
fn recovers_from_error_on_next() {
    // [A, B, C]: play A, next to B, B fails, next tries C
    let (mut session, spy) = session();
    session.start(playlist(&["A", "B", "C"]), 0).unwrap();
    assert_eq!(session.state(), InternalState::Preparing);
    session.on_prepared();
    assert_eq!(session.current_track().unwrap().track_name, "A");

    session.next();
    assert_eq!(session.state(), InternalState::Preparing);
    assert_eq!(session.current_track().unwrap().track_name, "B");

    session.on_playback_error(1, -110);
    assert_eq!(session.state(), InternalState::Error);
    assert!(!spy.lock_held());

    spy.clear_calls();
    session.next();
    assert_eq!(session.state(), InternalState::Preparing);
    assert_eq!(session.current_track().unwrap().track_name, "C");
    assert_eq!(session.last_error(), None);
    assert_eq!(
        spy.calls(),
        vec![Call::Reset, Call::SetSource(url("C")), Call::Acquire, Call::Prepare]
    );
}

#[test]
fn previous_recovers_from_error_too() {
    let (mut session, _spy) = playing_session(&["A", "B"], 1);
    session.on_playback_error(1, 0);
    session.previous();
    assert_eq!(session.state(), InternalState::Preparing);
    assert_eq!(session.cursor(), Some(0));
}

#[test]
fn lock_invariant_holds_across_transitions() {
    let (mut session, spy) = session();
    let check = |session: &PlaybackSession<MockBackend>| {
        assert_eq!(
            spy.lock_held(),
            session.state().holds_keep_alive(),
            "state {}",
            session.state()
        );
    };

    session.start(playlist(&["A", "B", "C"]), 0).unwrap();
    check(&session);
    session.on_prepared();
    check(&session);
    session.pause().unwrap();
    check(&session);
    session.next();
    check(&session);
    session.on_prepared();
    check(&session);
    session.on_playback_completed();
    check(&session);
    session.on_playback_error(1, 0);
    check(&session);
    session.previous();
    check(&session);
    session.stop();
    check(&session);
}

#[test]
fn stop_releases_everything() {
    let (mut session, spy) = playing_session(&["A", "B"], 0);
    session.stop();

    assert_eq!(session.state(), InternalState::Stopped);
    assert_eq!(session.external_state(), PlaybackState::Inactive);
    assert!(!session.is_active());
    assert_eq!(spy.calls(), vec![Call::ReleaseLock, Call::Reset]);

    session.next();
    assert_eq!(session.state(), InternalState::Preparing);
    assert_eq!(session.cursor(), Some(1));
}

#[test]
fn drop_releases_lock_and_decoder() {
    let (session, spy) = playing_session(&["A"], 0);
    drop(session);

    assert!(!spy.lock_held());
    assert_eq!(spy.calls(), vec![Call::ReleaseLock, Call::Release]);
}

#[test]
fn is_active_tracks_session() {
    let (mut session, _spy) = session();
    session.start(playlist(&["A"]), 0).unwrap();
    assert!(session.is_active());
    session.on_prepared();
    assert!(session.is_active());
    session.pause().unwrap();
    assert!(session.is_active());
    session.on_playback_error(1, 0);
    assert!(!session.is_active());
}

#[test]
fn notification_follows_every_transition() {
    let (backend, spy) = MockBackend::new();
    let sink = MockSink {
        spy: spy.clone(),
    };
    let mut session = PlaybackSession::new(backend).with_notifications("Streamer", sink);

    session.start(playlist(&["A", "B"]), 0).unwrap();
    session.on_prepared();
    session.pause().unwrap();
    session.on_playback_error(1, 0);

    let published = spy.published();
    let summary: Vec<_> = published
        .iter()
        .map(|p| (p.text.clone(), p.pause_play().icon))
        .collect();
    assert_eq!(
        summary,
        vec![
            // activation happens once the first track is preparing
            ("A".to_string(), ActionIcon::Pause),
            ("A".to_string(), ActionIcon::Pause),
            ("A".to_string(), ActionIcon::Play),
            (ERROR_TEXT.to_string(), ActionIcon::Play),
        ]
    );
    assert!(published.iter().all(|p| p.title == "Streamer"));

    session.stop();
    assert_eq!(spy.cancelled(), 1);
    assert_eq!(spy.published().len(), 4);
}

#[test]
fn notification_is_silent_before_start() {
    let (backend, spy) = MockBackend::new();
    let sink = MockSink {
        spy: spy.clone(),
    };
    let mut session = PlaybackSession::new(backend).with_notifications("Streamer", sink);
    session.next();
    session.stop();

    assert!(spy.published().is_empty());
    assert_eq!(spy.cancelled(), 0);
}

#[test]
fn observers_see_each_transition() {
    let (mut session, _spy) = session();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    session.add_observer(move |snapshot: &SessionSnapshot| {
        sink.lock().unwrap().push((snapshot.state, snapshot.cursor));
    });

    session.start(playlist(&["A", "B"]), 1).unwrap();
    session.on_prepared();
    session.on_playback_completed();

    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            (PlaybackState::Playing, Some(1)),
            (PlaybackState::Playing, Some(1)),
            (PlaybackState::Playing, Some(0)),
        ]
    );
}

#[test]
fn snapshot_reports_error_text() {
    let (mut session, _spy) = session();
    session
        .start(Playlist::new(vec![test_track("A", Some(""))]).unwrap(), 0)
        .unwrap();

    let snapshot = session.snapshot();
    assert_eq!(snapshot.state, PlaybackState::Error);
    assert!(!snapshot.active);
    assert_eq!(snapshot.track.unwrap().track_name, "A");
    assert!(snapshot.error.unwrap().contains("invalid audio source"));
}
