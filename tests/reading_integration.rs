//! Integration tests for the reading state machine
//!
//! Tests the full path: presence signal → ReadingEngine → FrameOutput

use palm_aura::config::ReadingConfig;
use palm_aura::core::{CommandQueue, ReadingEngine, ReadingSession};
use palm_aura::types::{AudioCommand, ReadingPhase, ReasonCode, AURA_CATALOG};
use palm_aura::{FADE_MIN, REVEAL_THRESHOLD_MS};
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn session(seed: u64) -> ReadingSession<CommandQueue> {
    let config = ReadingConfig::default().with_threshold(5000);
    ReadingSession::new(ReadingEngine::with_seed(config, seed), CommandQueue::new())
}

/// The 5000ms walkthrough: start, half-way, reveal
#[test]
fn test_five_second_walkthrough() {
    let mut session = session(42);

    let start = session.tick(true, 0);
    assert_eq!(start.phase, ReadingPhase::Charging);
    assert_eq!(start.progress, 0.0);

    let half = session.tick(true, 2500);
    assert_eq!(half.progress, 0.5);
    assert_eq!(half.hue, 180.0);

    let done = session.tick(true, 5001);
    assert_eq!(done.phase, ReadingPhase::Revealed);
    assert_eq!(done.reason, ReasonCode::R003_REVEALED);
    assert!(done.aura.is_some());

    let commands = session.player().commands();
    assert_eq!(commands.len(), 1);
    assert!(matches!(commands[0], AudioCommand::Start { .. }));
}

/// Continuous hand for at least the threshold reveals exactly once
#[test]
fn test_continuous_hand_reveals_once() {
    let mut session = session(1);
    let mut reveals = 0;
    let mut t = 0;
    while t <= REVEAL_THRESHOLD_MS * 2 {
        let output = session.tick(true, t);
        if output.reason == ReasonCode::R003_REVEALED {
            reveals += 1;
        }
        t += 16;
    }
    assert_eq!(reveals, 1);
    assert_eq!(session.player().len(), 1);
    let chosen = session.engine().chosen_aura().unwrap();
    assert!(AURA_CATALOG.iter().any(|a| a == chosen));
}

/// Losing the hand before the threshold discards the charge
#[test]
fn test_early_hand_loss_resets_charge() {
    let mut session = session(2);
    for t in (0..3000).step_by(16) {
        session.tick(true, t);
    }
    assert!(session.engine().fade_level() > FADE_MIN);

    let output = session.tick(false, 3000);
    assert_eq!(output.phase, ReadingPhase::Idle);
    assert_eq!(output.progress, 0.0);
    assert_eq!(session.engine().charge_start_ms(), None);
    assert_eq!(session.engine().fade_level(), FADE_MIN);
    assert!(session.player().is_empty());
}

/// A fresh charge after a loss starts its timer from the new arrival
#[test]
fn test_recharge_restarts_timer() {
    let mut session = session(3);
    session.tick(true, 0);
    session.tick(true, 4000);
    session.tick(false, 4100);

    let again = session.tick(true, 4200);
    assert_eq!(again.reason, ReasonCode::R002_CHARGE_STARTED);
    assert_eq!(session.tick(true, 9000).phase, ReadingPhase::Charging);
    assert_eq!(session.tick(true, 9201).phase, ReadingPhase::Revealed);
}

/// Once revealed, only reset leaves the phase
#[test]
fn test_revealed_is_sticky() {
    let mut session = session(4);
    session.tick(true, 0);
    session.tick(true, 5001);
    let aura = session.engine().chosen_aura();

    for i in 0..200 {
        let output = session.tick(i % 3 == 0, 5001 + i * 16);
        assert_eq!(output.phase, ReadingPhase::Revealed);
    }
    assert_eq!(session.engine().chosen_aura(), aura);
    assert_eq!(session.player().len(), 1);
}

/// Reset from Revealed emits one stop for the chosen track
#[test]
fn test_reset_from_revealed() {
    let mut session = session(5);
    session.tick(true, 0);
    session.tick(true, 5001);
    let track = session.engine().chosen_aura().unwrap().sound_track;

    let output = session.reset();
    assert_eq!(output.audio, Some(AudioCommand::Stop { track }));
    assert_eq!(output.reason, ReasonCode::R004_RESET);
    assert_eq!(output.phase, ReadingPhase::Idle);
    assert_eq!(session.engine().phase(), ReadingPhase::Idle);
    assert_eq!(session.engine().current_output().reason, ReasonCode::R004_RESET);
    assert!(session.engine().chosen_aura().is_none());

    let stops = session
        .player()
        .commands()
        .iter()
        .filter(|c| matches!(c, AudioCommand::Stop { .. }))
        .count();
    assert_eq!(stops, 1);

    // A second reset has nothing left to stop
    assert_eq!(session.reset().audio, None);
}

/// After a reset a new reading can reveal a new aura
#[test]
fn test_second_reading_after_reset() {
    let mut session = session(6);
    session.tick(true, 0);
    session.tick(true, 5001);
    session.reset();

    session.tick(true, 6000);
    let output = session.tick(true, 11_001);
    assert_eq!(output.phase, ReadingPhase::Revealed);
    assert_eq!(session.player().len(), 3);
}

/// Progress stays in [0, 1] and never decreases while charging
#[test]
fn test_progress_monotonic_while_charging() {
    let mut session = session(7);
    let mut last = 0.0;
    for t in (0..=5000).step_by(7) {
        let output = session.tick(true, t);
        assert_eq!(output.phase, ReadingPhase::Charging);
        assert!((0.0..=1.0).contains(&output.progress));
        assert!(output.progress >= last);
        last = output.progress;
    }
}

/// Backwards clocks are clamped, never negative
#[test]
fn test_clock_regression_never_decreases_progress() {
    let mut session = session(8);
    session.tick(true, 1000);
    let before = session.tick(true, 3000);
    let after = session.tick(true, 500);
    assert!(after.clock_clamped);
    assert_eq!(after.phase, ReadingPhase::Charging);
    assert!(after.progress >= before.progress);
}

/// The aura/phase invariants hold under arbitrary input
#[test]
fn test_invariants_under_random_input() {
    let mut rng = StdRng::seed_from_u64(99);
    let mut session = session(9);
    let mut now = 0u64;

    for _ in 0..5000 {
        now += rng.gen_range(0..120);
        if rng.gen_bool(0.01) {
            session.reset();
        } else {
            session.tick(rng.gen_bool(0.8), now);
        }

        let engine = session.engine();
        let revealed = engine.phase() == ReadingPhase::Revealed;
        assert_eq!(engine.chosen_aura().is_some(), revealed);
        assert_eq!(engine.charge_start_ms().is_some(), engine.phase() == ReadingPhase::Charging);
        let fade = engine.fade_level();
        assert!(fade >= engine.config().fade.min && fade <= engine.config().fade.max);
    }

    // One start per reveal, one stop per reset that had an aura
    let commands = session.player().commands();
    let starts = commands.iter().filter(|c| matches!(c, AudioCommand::Start { .. })).count();
    let stops = commands.iter().filter(|c| matches!(c, AudioCommand::Stop { .. })).count();
    let playing = usize::from(session.engine().phase() == ReadingPhase::Revealed);
    assert_eq!(starts, stops + playing);
}

/// Test JSON output is valid
#[test]
fn test_json_output_valid() {
    let mut session = session(10);
    session.tick(true, 0);
    let output = session.tick(true, 5001);

    let json = serde_json::to_string(&output).unwrap();
    assert!(json.contains("\"phase\":\"REVEALED\""));
    assert!(json.contains("\"audio\""));
    assert!(json.contains("\"aura\""));

    let back: palm_aura::types::FrameOutput = serde_json::from_str(&json).unwrap();
    assert_eq!(back.phase, ReadingPhase::Revealed);
    assert_eq!(back.aura, output.aura);
}

/// Test parseable output format
#[test]
fn test_parseable_output_format() {
    let mut session = session(11);
    let output = session.tick(true, 0);
    let formatted = output.to_parseable_string();
    assert!(formatted.contains("phase=CHARGING"));
    assert!(formatted.contains("progress="));
    assert!(formatted.contains("reason=R002_CHARGE_STARTED"));
}
