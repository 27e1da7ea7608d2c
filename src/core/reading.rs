//! Reading Engine: palm-presence state machine with timed reveal
//!
//! Phase transitions:
//! - IDLE/DETECTING → CHARGING: hand present (timer starts)
//! - CHARGING → IDLE: hand lost before the threshold (fade resets)
//! - IDLE/CHARGING → DETECTING: hand seen outside the zone (gated only)
//! - CHARGING → REVEALED: hand present AND charged > threshold (aura drawn)
//! - REVEALED → IDLE: explicit reset only (reported as R004_RESET)

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use sha2::{Digest, Sha256};

use crate::config::ReadingConfig;
use crate::core::presence::{Presence, PresenceGate};
use crate::types::{
    AudioCommand, AuraHalo, AuraProfile, AuraSummary, Frame, FrameOutput, ReadingPhase,
    ReasonCode, AURA_CATALOG,
};

/// Rainbow hue (degrees) for a charge progress in `[0, 1]`
pub fn hue_for_progress(progress: f64) -> f64 {
    progress.clamp(0.0, 1.0) * 360.0
}

/// Derive a reproducible RNG seed from a phrase
pub fn seed_from_phrase(phrase: &str) -> u64 {
    let digest = Sha256::digest(phrase.as_bytes());
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[0..8]);
    u64::from_le_bytes(bytes)
}

/// Palm reading state machine
#[derive(Debug)]
pub struct ReadingEngine {
    config: ReadingConfig,
    gate: PresenceGate,
    rng: StdRng,
    /// Current phase
    phase: ReadingPhase,
    /// When the current charge began; only set while charging
    charge_start_ms: Option<u64>,
    /// Aura drawn on reveal; only set while revealed
    chosen_aura: Option<&'static AuraProfile>,
    fade_level: f64,
    /// Highest clock value seen so far
    last_now_ms: Option<u64>,
    /// When the reveal happened
    revealed_at_ms: Option<u64>,
    /// Outcome of the last tick or reset
    last_reason: ReasonCode,
    /// Number of ticks processed
    tick_count: u64,
}

impl Default for ReadingEngine {
    fn default() -> Self {
        Self::new(ReadingConfig::default())
    }
}

impl ReadingEngine {
    /// Create new engine with an entropy-seeded RNG
    pub fn new(config: ReadingConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Create new engine whose aura draws are reproducible
    pub fn with_seed(config: ReadingConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    pub fn with_seed_phrase(config: ReadingConfig, phrase: &str) -> Self {
        Self::with_seed(config, seed_from_phrase(phrase))
    }

    fn with_rng(config: ReadingConfig, rng: StdRng) -> Self {
        let fade_level = config.fade.min;
        Self {
            gate: PresenceGate::new(config.zone),
            config,
            rng,
            phase: ReadingPhase::Idle,
            charge_start_ms: None,
            chosen_aura: None,
            fade_level,
            last_now_ms: None,
            revealed_at_ms: None,
            last_reason: ReasonCode::R001_NO_HAND,
            tick_count: 0,
        }
    }

    /// Assess a detector frame through the presence gate, then tick
    pub fn observe(&mut self, frame: &Frame, now_ms: u64) -> FrameOutput {
        let presence = self.gate.assess(frame);
        let mut output = self.advance(presence, now_ms);
        if output.phase == ReadingPhase::Revealed {
            output.halos = frame.hands.iter().filter_map(|h| h.halo()).collect();
        }
        output
    }

    /// Advance one frame with a plain presence flag
    pub fn tick(&mut self, hand_present: bool, now_ms: u64) -> FrameOutput {
        let presence = if hand_present { Presence::Present } else { Presence::Absent };
        self.advance(presence, now_ms)
    }

    fn advance(&mut self, presence: Presence, now_ms: u64) -> FrameOutput {
        self.tick_count += 1;

        // Clamp regressing clocks so elapsed time never goes negative
        let clock_clamped = self.last_now_ms.map(|last| now_ms < last).unwrap_or(false);
        let now = match self.last_now_ms {
            Some(last) if now_ms < last => {
                warn!("clock regressed from {}ms to {}ms; clamping", last, now_ms);
                last
            }
            _ => now_ms,
        };
        self.last_now_ms = Some(now);

        let (reason, audio) = match (self.phase, presence) {
            (phase, _) if phase.is_sticky() => (ReasonCode::R003_REVEAL_HELD, None),

            (ReadingPhase::Charging, Presence::Present) => {
                if self.elapsed_at(now) > self.config.reveal_threshold_ms {
                    let command = self.reveal(now);
                    (ReasonCode::R003_REVEALED, Some(command))
                } else {
                    self.raise_fade();
                    (ReasonCode::R002_CHARGE_ACCUMULATING, None)
                }
            }

            (_, Presence::Present) => {
                info!("hand detected at {}ms; charging", now);
                self.phase = ReadingPhase::Charging;
                self.charge_start_ms = Some(now);
                self.raise_fade();
                (ReasonCode::R002_CHARGE_STARTED, None)
            }

            (phase, Presence::Absent) => {
                self.settle(ReadingPhase::Idle);
                let reason = if phase == ReadingPhase::Charging {
                    info!("hand lost at {}ms; charge cancelled", now);
                    ReasonCode::R002_CHARGE_LOST
                } else {
                    ReasonCode::R001_NO_HAND
                };
                (reason, None)
            }

            (phase, Presence::OutOfZone) => {
                if phase == ReadingPhase::Charging {
                    info!("hand left the zone at {}ms; charge cancelled", now);
                }
                self.settle(ReadingPhase::Detecting);
                (ReasonCode::R001_OUT_OF_ZONE, None)
            }
        };

        self.last_reason = reason;
        let output = self.output_at(now, reason, audio, clock_clamped);
        debug!("{}", output.to_parseable_string());
        output
    }

    /// Leave (or stay out of) Charging without revealing
    fn settle(&mut self, phase: ReadingPhase) {
        self.phase = phase;
        self.charge_start_ms = None;
        self.fade_level = self.config.fade.min;
    }

    fn raise_fade(&mut self) {
        self.fade_level = (self.fade_level + self.config.fade.step).min(self.config.fade.max);
    }

    /// Enter Revealed, drawing an aura if none was chosen this session
    fn reveal(&mut self, now: u64) -> AudioCommand {
        let aura = match self.chosen_aura {
            Some(aura) => aura,
            None => {
                let aura = AURA_CATALOG
                    .choose(&mut self.rng)
                    .unwrap_or(&AURA_CATALOG[0]);
                self.chosen_aura = Some(aura);
                aura
            }
        };
        self.phase = ReadingPhase::Revealed;
        self.charge_start_ms = None;
        self.revealed_at_ms = Some(now);
        info!("aura revealed at {}ms: {} ({})", now, aura.color_name, aura.sound_track);

        AudioCommand::Start {
            track: aura.sound_track,
            volume: self.config.volumes.for_track(aura.sound_track),
        }
    }

    /// Explicit reset: back to Idle from any phase.
    ///
    /// The output carries `R004_RESET` and, if a track was playing, the
    /// stop command for it. Resets do not count as ticks.
    pub fn reset(&mut self) -> FrameOutput {
        let stop = self
            .chosen_aura
            .take()
            .map(|aura| AudioCommand::Stop { track: aura.sound_track });
        info!("session reset from {}", self.phase);
        self.settle(ReadingPhase::Idle);
        self.revealed_at_ms = None;
        self.last_reason = ReasonCode::R004_RESET;

        let now = self.last_now_ms.unwrap_or(0);
        self.output_at(now, ReasonCode::R004_RESET, stop, false)
    }

    fn elapsed_at(&self, now: u64) -> u64 {
        self.charge_start_ms
            .map(|start| now.saturating_sub(start))
            .unwrap_or(0)
    }

    /// Charge progress in `[0, 1]`
    fn progress_at(&self, now: u64) -> f64 {
        match self.phase {
            ReadingPhase::Revealed => 1.0,
            ReadingPhase::Charging => {
                let elapsed = self.elapsed_at(now) as f64;
                (elapsed / self.config.reveal_threshold_ms as f64).clamp(0.0, 1.0)
            }
            _ => 0.0,
        }
    }

    fn output_at(
        &self,
        now: u64,
        reason: ReasonCode,
        audio: Option<AudioCommand>,
        clock_clamped: bool,
    ) -> FrameOutput {
        let threshold = self.config.reveal_threshold_ms;
        let elapsed = match self.phase {
            ReadingPhase::Revealed => threshold,
            _ => self.elapsed_at(now).min(threshold),
        };
        let progress = self.progress_at(now);
        FrameOutput {
            timestamp: chrono::Utc::now(),
            tick: self.tick_count,
            now_ms: now,
            phase: self.phase,
            progress,
            hue: hue_for_progress(progress),
            fade_level: self.fade_level,
            elapsed_ms: elapsed,
            remaining_ms: threshold - elapsed,
            reason,
            aura: self.chosen_aura.map(AuraSummary::from),
            revealed_at_ms: self.revealed_at_ms,
            halos: Vec::new(),
            audio,
            clock_clamped,
        }
    }

    /// Get current output without ticking; reports the last outcome
    pub fn current_output(&self) -> FrameOutput {
        let now = self.last_now_ms.unwrap_or(0);
        self.output_at(now, self.last_reason, None, false)
    }

    /// Get current phase
    pub fn phase(&self) -> ReadingPhase {
        self.phase
    }

    pub fn charge_start_ms(&self) -> Option<u64> {
        self.charge_start_ms
    }

    pub fn chosen_aura(&self) -> Option<&'static AuraProfile> {
        self.chosen_aura
    }

    pub fn fade_level(&self) -> f64 {
        self.fade_level
    }

    /// Get tick count
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn config(&self) -> &ReadingConfig {
        &self.config
    }

    /// Halos over every hand in a frame, scaled to the canvas, when the aura is showing
    pub fn halos_on(&self, frame: &Frame, canvas_w: f64, canvas_h: f64) -> Vec<AuraHalo> {
        if self.phase != ReadingPhase::Revealed {
            return Vec::new();
        }
        frame
            .hands
            .iter()
            .filter_map(|h| h.halo())
            .map(|halo| halo.scaled(frame, canvas_w, canvas_h))
            .collect()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ZoneBand;
    use crate::types::{HandDetection, SoundTrack};
    use crate::{FADE_MIN, FADE_STEP, HALO_ALPHA, REVEAL_THRESHOLD_MS};

    fn engine() -> ReadingEngine {
        ReadingEngine::with_seed(ReadingConfig::default(), 7)
    }

    #[test]
    fn test_initial_phase_is_idle() {
        let engine = engine();
        assert_eq!(engine.phase(), ReadingPhase::Idle);
        assert_eq!(engine.fade_level(), FADE_MIN);
        assert!(engine.chosen_aura().is_none());
    }

    #[test]
    fn test_hand_starts_charging() {
        let mut engine = engine();
        let output = engine.tick(true, 100);
        assert_eq!(output.phase, ReadingPhase::Charging);
        assert_eq!(output.reason, ReasonCode::R002_CHARGE_STARTED);
        assert_eq!(engine.charge_start_ms(), Some(100));
        assert_eq!(output.progress, 0.0);
    }

    #[test]
    fn test_charge_start_is_not_moved_by_later_ticks() {
        let mut engine = engine();
        engine.tick(true, 100);
        engine.tick(true, 200);
        assert_eq!(engine.charge_start_ms(), Some(100));
    }

    #[test]
    fn test_hand_loss_returns_to_idle() {
        let mut engine = engine();
        engine.tick(true, 0);
        engine.tick(true, 1000);
        let output = engine.tick(false, 1500);
        assert_eq!(output.phase, ReadingPhase::Idle);
        assert_eq!(output.reason, ReasonCode::R002_CHARGE_LOST);
        assert_eq!(engine.charge_start_ms(), None);
        assert_eq!(engine.fade_level(), FADE_MIN);
    }

    #[test]
    fn test_reveal_requires_strictly_more_than_threshold() {
        let mut engine = engine();
        engine.tick(true, 0);
        let at = engine.tick(true, REVEAL_THRESHOLD_MS);
        assert_eq!(at.phase, ReadingPhase::Charging);
        assert_eq!(at.progress, 1.0);

        let past = engine.tick(true, REVEAL_THRESHOLD_MS + 1);
        assert_eq!(past.phase, ReadingPhase::Revealed);
        assert!(past.aura.is_some());
    }

    #[test]
    fn test_reveal_emits_start_with_track_volume() {
        let mut engine = engine();
        engine.tick(true, 0);
        let output = engine.tick(true, 6000);
        let aura = engine.chosen_aura().unwrap();
        let expected_volume = if aura.sound_track == SoundTrack::Calm { 0.5 } else { 0.3 };
        assert_eq!(
            output.audio,
            Some(AudioCommand::Start { track: aura.sound_track, volume: expected_volume })
        );
    }

    #[test]
    fn test_revealed_ignores_hand_loss() {
        let mut engine = engine();
        engine.tick(true, 0);
        engine.tick(true, 6000);
        for t in 0..50 {
            let output = engine.tick(false, 6000 + t * 16);
            assert_eq!(output.phase, ReadingPhase::Revealed);
            assert!(output.audio.is_none());
        }
    }

    #[test]
    fn test_reset_stops_track_and_clears() {
        let mut engine = engine();
        engine.tick(true, 0);
        engine.tick(true, 6000);
        let track = engine.chosen_aura().unwrap().sound_track;

        let output = engine.reset();
        assert_eq!(output.audio, Some(AudioCommand::Stop { track }));
        assert_eq!(output.reason, ReasonCode::R004_RESET);
        assert_eq!(output.phase, ReadingPhase::Idle);
        assert_eq!(output.revealed_at_ms, None);
        assert!(output.aura.is_none());
        assert_eq!(engine.phase(), ReadingPhase::Idle);
        assert!(engine.chosen_aura().is_none());
        assert_eq!(engine.fade_level(), FADE_MIN);
    }

    #[test]
    fn test_reset_without_aura_emits_nothing() {
        let mut engine = engine();
        engine.tick(true, 0);
        let output = engine.reset();
        assert_eq!(output.audio, None);
        assert_eq!(output.reason, ReasonCode::R004_RESET);
        assert_eq!(engine.phase(), ReadingPhase::Idle);
        assert_eq!(engine.charge_start_ms(), None);
    }

    #[test]
    fn test_fade_rises_while_charging_and_clamps() {
        let mut engine = ReadingEngine::with_seed(ReadingConfig::default().with_threshold(60_000), 1);
        engine.tick(true, 0);
        assert_eq!(engine.fade_level(), FADE_MIN + FADE_STEP);
        for t in 1..500 {
            engine.tick(true, t * 16);
        }
        assert_eq!(engine.fade_level(), engine.config().fade.max);
    }

    #[test]
    fn test_clock_regression_is_clamped() {
        let mut engine = engine();
        engine.tick(true, 1000);
        engine.tick(true, 3000);
        let output = engine.tick(true, 2000);
        assert!(output.clock_clamped);
        assert_eq!(output.now_ms, 3000);
        assert_eq!(output.elapsed_ms, 2000);
    }

    #[test]
    fn test_hue_tracks_progress() {
        assert_eq!(hue_for_progress(0.0), 0.0);
        assert_eq!(hue_for_progress(0.5), 180.0);
        assert_eq!(hue_for_progress(2.0), 360.0);
    }

    #[test]
    fn test_same_seed_same_aura() {
        let mut a = ReadingEngine::with_seed_phrase(ReadingConfig::default(), "palm");
        let mut b = ReadingEngine::with_seed_phrase(ReadingConfig::default(), "palm");
        for engine in [&mut a, &mut b] {
            engine.tick(true, 0);
            engine.tick(true, 5001);
        }
        assert_eq!(a.chosen_aura(), b.chosen_aura());
    }

    #[test]
    fn test_seed_phrase_is_stable() {
        assert_eq!(seed_from_phrase("aura"), seed_from_phrase("aura"));
        assert_ne!(seed_from_phrase("aura"), seed_from_phrase("palm"));
    }

    #[test]
    fn test_out_of_zone_enters_detecting() {
        let config = ReadingConfig::gated();
        let mut engine = ReadingEngine::with_seed(config, 3);
        let frame = Frame::with_hand_at(640.0, 480.0, 0.9);
        let output = engine.observe(&frame, 0);
        assert_eq!(output.phase, ReadingPhase::Detecting);
        assert_eq!(engine.charge_start_ms(), None);
    }

    #[test]
    fn test_leaving_zone_cancels_charge() {
        let config = ReadingConfig::default().with_zone(ZoneBand::default());
        let mut engine = ReadingEngine::with_seed(config, 3);
        engine.observe(&Frame::with_hand_at(640.0, 480.0, 0.5), 0);
        engine.observe(&Frame::with_hand_at(640.0, 480.0, 0.5), 500);
        let output = engine.observe(&Frame::with_hand_at(640.0, 480.0, 0.95), 1000);
        assert_eq!(output.phase, ReadingPhase::Detecting);
        assert_eq!(output.fade_level, FADE_MIN);
        assert_eq!(output.progress, 0.0);
    }

    #[test]
    fn test_observe_reports_halo_after_reveal() {
        let mut engine = engine();
        let frame = Frame::with_hand_at(640.0, 480.0, 0.5);
        engine.observe(&frame, 0);
        let output = engine.observe(&frame, 5001);
        assert_eq!(output.phase, ReadingPhase::Revealed);
        assert_eq!(output.halos.len(), 1);
        assert!((output.halos[0].center_x - 320.0).abs() < 1e-9);
        assert_eq!(output.halos[0].alpha, HALO_ALPHA);
        assert_eq!(engine.halos_on(&frame, 1280.0, 960.0).len(), 1);
    }

    #[test]
    fn test_halo_drawn_over_every_hand() {
        let mut engine = engine();
        let one = Frame::with_hand_at(640.0, 480.0, 0.3);
        let two = one.clone().with_hand(HandDetection::centered_at(640.0 * 0.8, 240.0, 64.0));
        engine.observe(&one, 0);
        let output = engine.observe(&two, 5001);
        assert_eq!(output.halos.len(), 2);
        assert!((output.halos[1].center_x - 512.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_halos_before_reveal() {
        let mut engine = engine();
        let output = engine.observe(&Frame::with_hand_at(640.0, 480.0, 0.5), 0);
        assert!(output.halos.is_empty());
        assert!(engine.halos_on(&Frame::with_hand_at(640.0, 480.0, 0.5), 640.0, 480.0).is_empty());
    }

    #[test]
    fn test_reveal_time_reported_until_reset() {
        let mut engine = engine();
        engine.tick(true, 0);
        assert_eq!(engine.tick(true, 5001).revealed_at_ms, Some(5001));
        assert_eq!(engine.tick(false, 7000).revealed_at_ms, Some(5001));
        assert_eq!(engine.reset().revealed_at_ms, None);
    }

    #[test]
    fn test_current_output_reports_reset() {
        let mut engine = engine();
        engine.tick(true, 0);
        engine.tick(true, 5001);
        assert_eq!(engine.current_output().reason, ReasonCode::R003_REVEALED);
        engine.reset();
        let output = engine.current_output();
        assert_eq!(output.reason, ReasonCode::R004_RESET);
        assert_eq!(output.phase, ReadingPhase::Idle);
        assert!(output.audio.is_none());

        assert_eq!(engine.tick(false, 6000).reason, ReasonCode::R001_NO_HAND);
    }
}
