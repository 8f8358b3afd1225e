//! End-to-end judging through `Session`.
//!
//! Covers microphone, remote and unavailable players from captured samples
//! (or remote events) to the final score.
//!
//! Run with: cargo test --test session_integration

mod helpers;

use approx::assert_abs_diff_eq;
use cantor::prelude::*;
use cantor::{Error, RemotePitchEvent, SchedulerState};
use helpers::*;

fn single_note_song() -> std::sync::Arc<Song> {
    song(&[&[(0, 4, 60, NoteKind::Normal)]])
}

/// Feed `blocks` 10 ms blocks to player 0, ticking after each.
fn sing(session: &mut Session, semitone: Option<i32>, blocks: usize) {
    let mut sine = semitone.map(SineBlocks::semitone);
    for i in 0..blocks {
        let block = match &mut sine {
            Some(sine) => sine.next_block(),
            None => generate_silence(BLOCK_LEN),
        };
        session.write_samples(0, &block).unwrap();
        session.tick((i + 1) as f64 * 10.0);
    }
}

#[test]
fn test_perfect_single_note_scores_maximum() {
    init_tracing();
    let mut session = Session::builder()
        .song(single_note_song())
        .player(PlayerSetup::microphone("P1", DeviceConfig::default()))
        .build()
        .unwrap();
    let sentences = session.player_mut(0).unwrap().score_mut().subscribe_sentence_scores();

    sing(&mut session, Some(60), 210);
    session.finish();

    let rated: Vec<_> = sentences.try_iter().collect();
    assert_eq!(rated.len(), 1);
    assert_abs_diff_eq!(rated[0].correct_fraction, 1.0);
    assert_eq!(rated[0].rating, SentenceRating::Perfect);

    let snapshot = session.players()[0].snapshot();
    assert_eq!(snapshot.normal, 9000);
    assert_eq!(snapshot.bonus, 1000);
    assert_eq!(snapshot.total, 10000);
    assert_eq!(
        session.players()[0].scheduler().state(),
        SchedulerState::Finished
    );
}

#[test]
fn test_silent_player_scores_nothing() {
    let mut session = Session::builder()
        .song(single_note_song())
        .player(PlayerSetup::microphone("P1", DeviceConfig::default()))
        .build()
        .unwrap();
    let readout = session.players()[0].score().readout();

    sing(&mut session, None, 210);
    session.finish();

    let snapshot = readout.load();
    assert_eq!(snapshot.total, 0);
    assert_eq!(snapshot.rated_sentences, 1);
}

#[test]
fn test_remote_player_is_judged_from_events() {
    init_tracing();
    let mut session = Session::builder()
        .song(single_note_song())
        .player(PlayerSetup::remote("Phone"))
        .build()
        .unwrap();
    let mut producer = session.player_mut(0).unwrap().take_remote_producer().unwrap();
    assert!(session.player_mut(0).unwrap().take_remote_producer().is_none());

    for beat in 0..4 {
        assert!(producer.push(RemotePitchEvent {
            beat,
            semitone: 72,
            frequency_hz: 523.25,
        }));
    }
    session.tick(2000.0);
    session.finish();

    // An octave off still counts.
    let snapshot = session.players()[0].snapshot();
    assert_eq!(snapshot.total, 10000);
    assert!(session.players()[0].buffer().is_none());
}

#[test]
fn test_unavailable_device_builds_disabled_player() {
    let mut session = Session::builder()
        .song(single_note_song())
        .player(PlayerSetup::microphone("P1", DeviceConfig::default()))
        .player(PlayerSetup::unavailable(
            "P2",
            DeviceConfig::default(),
            "device unplugged",
        ))
        .build()
        .unwrap();

    assert_eq!(
        session.players()[1].scheduler().state(),
        SchedulerState::Disabled
    );
    // Writing to a player without a buffer is a no-op.
    session.write_samples(1, &generate_silence(BLOCK_LEN)).unwrap();
    sing(&mut session, Some(60), 210);
    session.finish();

    let totals: Vec<u32> = session.snapshots().iter().map(|s| s.total).collect();
    assert_eq!(totals, [10000, 0]);
}

#[test]
fn test_disable_and_cancel_stop_judging() {
    let mut session = Session::builder()
        .song(single_note_song())
        .player(PlayerSetup::microphone("P1", DeviceConfig::default()))
        .player(PlayerSetup::remote("P2"))
        .build()
        .unwrap();

    session.disable_player(0, "capture lost").unwrap();
    session.cancel();
    sing(&mut session, Some(60), 210);

    assert_eq!(session.snapshots(), [ScoreSnapshot::default(); 2]);
    assert!(matches!(
        session.disable_player(5, "missing"),
        Err(Error::UnknownPlayer(5))
    ));
}

#[test]
fn test_builder_requires_song() {
    let result = Session::builder()
        .player(PlayerSetup::remote("P1"))
        .build();
    assert!(matches!(result, Err(Error::MissingSong)));
}

#[test]
fn test_builder_rejects_invalid_player_config() {
    let device = DeviceConfig {
        sample_rate: 1000,
        ..DeviceConfig::default()
    };
    let result = Session::builder()
        .song(single_note_song())
        .player(PlayerSetup::microphone("P1", device))
        .build();
    assert!(result.is_err());
}
