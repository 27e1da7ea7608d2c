//! Audio collaborator interface
//!
//! The engine never plays sound; it emits [`AudioCommand`]s which a player
//! executes. Each command is applied exactly once.

use log::info;

use crate::types::{AudioCommand, SoundTrack};

/// Anything that can start and stop the ambient loops
pub trait AudioPlayer {
    /// Start looping `track` at `volume` (0.0 – 1.0)
    fn start(&mut self, track: SoundTrack, volume: f32);

    /// Stop `track`
    fn stop(&mut self, track: SoundTrack);

    /// Dispatch a command to `start` or `stop`
    fn apply(&mut self, command: AudioCommand) {
        match command {
            AudioCommand::Start { track, volume } => self.start(track, volume),
            AudioCommand::Stop { track } => self.stop(track),
        }
    }
}

impl<P: AudioPlayer + ?Sized> AudioPlayer for Box<P> {
    fn start(&mut self, track: SoundTrack, volume: f32) {
        (**self).start(track, volume)
    }

    fn stop(&mut self, track: SoundTrack) {
        (**self).stop(track)
    }
}

/// Buffers commands for a remote player to collect
#[derive(Debug, Default, Clone)]
pub struct CommandQueue {
    commands: Vec<AudioCommand>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take all buffered commands
    pub fn drain(&mut self) -> Vec<AudioCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn commands(&self) -> &[AudioCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl AudioPlayer for CommandQueue {
    fn start(&mut self, track: SoundTrack, volume: f32) {
        self.commands.push(AudioCommand::Start { track, volume });
    }

    fn stop(&mut self, track: SoundTrack) {
        self.commands.push(AudioCommand::Stop { track });
    }
}

/// Logs commands and remembers which track is looping
#[derive(Debug, Default)]
pub struct LogPlayer {
    playing: Option<SoundTrack>,
}

impl LogPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn playing(&self) -> Option<SoundTrack> {
        self.playing
    }
}

impl AudioPlayer for LogPlayer {
    fn start(&mut self, track: SoundTrack, volume: f32) {
        info!("♪ looping {} at volume {:.1} ({})", track, volume, track.file_name());
        self.playing = Some(track);
    }

    fn stop(&mut self, track: SoundTrack) {
        info!("♪ stopped {}", track);
        if self.playing == Some(track) {
            self.playing = None;
        }
    }
}
