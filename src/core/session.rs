//! Reading session: one engine bound to one audio player
//!
//! The session forwards each audio command the engine emits to its player
//! exactly once, and drops ticks until the detector reports ready.

use log::info;

use crate::config::ReadingConfig;
use crate::core::audio::AudioPlayer;
use crate::core::reading::ReadingEngine;
use crate::types::{AudioCommand, Frame, FrameOutput, ReasonCode};

/// Engine plus audio output
#[derive(Debug)]
pub struct ReadingSession<P: AudioPlayer> {
    engine: ReadingEngine,
    player: P,
    ready: bool,
}

impl<P: AudioPlayer> ReadingSession<P> {
    /// Session that accepts ticks immediately
    pub fn new(engine: ReadingEngine, player: P) -> Self {
        Self { engine, player, ready: true }
    }

    /// Session that ignores ticks until [`mark_ready`](Self::mark_ready)
    pub fn awaiting_detector(engine: ReadingEngine, player: P) -> Self {
        Self { engine, player, ready: false }
    }

    pub fn with_config(config: ReadingConfig, player: P) -> Self {
        Self::new(ReadingEngine::new(config), player)
    }

    /// Detector finished loading
    pub fn mark_ready(&mut self) {
        if !self.ready {
            info!("detector ready");
        }
        self.ready = true;
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Feed one detector frame
    pub fn frame(&mut self, frame: &Frame, now_ms: u64) -> FrameOutput {
        if !self.ready {
            return self.not_ready_output();
        }
        let output = self.engine.observe(frame, now_ms);
        self.dispatch(output.audio);
        output
    }

    /// Feed one presence flag
    pub fn tick(&mut self, hand_present: bool, now_ms: u64) -> FrameOutput {
        if !self.ready {
            return self.not_ready_output();
        }
        let output = self.engine.tick(hand_present, now_ms);
        self.dispatch(output.audio);
        output
    }

    /// Explicit reset; stops the ambient track if one is playing
    pub fn reset(&mut self) -> FrameOutput {
        let output = self.engine.reset();
        self.dispatch(output.audio);
        output
    }

    fn dispatch(&mut self, command: Option<AudioCommand>) {
        if let Some(command) = command {
            self.player.apply(command);
        }
    }

    fn not_ready_output(&self) -> FrameOutput {
        let mut output = self.engine.current_output();
        output.reason = ReasonCode::R001_NOT_READY;
        output
    }

    pub fn engine(&self) -> &ReadingEngine {
        &self.engine
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut P {
        &mut self.player
    }
}
