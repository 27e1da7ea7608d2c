//! Per-frame output consumed by renderers and audio players

use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::{Deserialize, Serialize};

use crate::types::{AuraHalo, AuraProfile, ReadingPhase, ReasonCode, SoundTrack};

/// Command for the audio collaborator
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "lowercase")]
pub enum AudioCommand {
    /// Start looping `track` at `volume`
    Start { track: SoundTrack, volume: f32 },
    /// Stop `track`
    Stop { track: SoundTrack },
}

impl AudioCommand {
    pub fn track(&self) -> SoundTrack {
        match self {
            AudioCommand::Start { track, .. } | AudioCommand::Stop { track } => *track,
        }
    }
}

impl std::fmt::Display for AudioCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AudioCommand::Start { track, volume } => write!(f, "start({}, vol={:.1})", track, volume),
            AudioCommand::Stop { track } => write!(f, "stop({})", track),
        }
    }
}

/// Owned copy of the revealed aura, for serialization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuraSummary {
    pub color_name: String,
    pub color_hex: String,
    pub description: String,
    pub sound_track: SoundTrack,
}

impl From<&AuraProfile> for AuraSummary {
    fn from(aura: &AuraProfile) -> Self {
        Self {
            color_name: aura.color_name.to_string(),
            color_hex: aura.color_hex.to_string(),
            description: aura.description.to_string(),
            sound_track: aura.sound_track,
        }
    }
}

/// Output structure for each tick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameOutput {
    /// Wall-clock time the output was produced
    pub timestamp: DateTime<Utc>,
    /// Ticks processed so far in this session
    pub tick: u64,
    /// Effective clock value used for this tick (ms)
    pub now_ms: u64,
    pub phase: ReadingPhase,
    /// 0.0 – 1.0
    pub progress: f64,
    /// Degrees, `progress * 360`
    pub hue: f64,
    pub fade_level: f64,
    /// Charge accumulated so far (ms)
    pub elapsed_ms: u64,
    /// Charge still needed (ms)
    pub remaining_ms: u64,
    pub reason: ReasonCode,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub aura: Option<AuraSummary>,
    /// When the aura was revealed (ms)
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub revealed_at_ms: Option<u64>,
    /// Aura circles to draw, one per visible hand, once revealed
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub halos: Vec<AuraHalo>,
    /// Audio command issued on this tick
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub audio: Option<AudioCommand>,
    /// The supplied clock was earlier than a previous tick
    #[serde(default)]
    pub clock_clamped: bool,
}

impl FrameOutput {
    pub fn is_revealed(&self) -> bool {
        self.phase == ReadingPhase::Revealed
    }

    /// Format for terminal display (with colors)
    pub fn to_terminal_string(&self) -> String {
        let color = self.phase.color_code();
        let reset = ReadingPhase::color_reset();
        let emoji = self.phase.emoji();

        let mut line = format!(
            "{}{} t={}ms | phase={} | progress={:>3.0}% | hue={:>3.0} | fade={:.0} | {}{}",
            color,
            emoji,
            self.now_ms,
            self.phase,
            self.progress * 100.0,
            self.hue,
            self.fade_level,
            self.reason.code(),
            reset
        );
        if let Some(aura) = &self.aura {
            let (r, g, b) = AuraProfile::by_name(&aura.color_name)
                .map(|a| a.rgb())
                .unwrap_or((255, 255, 255));
            line.push_str(&format!(" | aura={}", aura.color_name.truecolor(r, g, b).bold()));
        }
        if let Some(cmd) = &self.audio {
            line.push_str(&format!(" | audio={}", cmd));
        }
        line
    }

    /// Format for parseable output (no colors)
    pub fn to_parseable_string(&self) -> String {
        let mut line = format!(
            "t={} | phase={} | progress={:.3} | hue={:.1} | fade={:.1} | reason={}",
            self.now_ms,
            self.phase,
            self.progress,
            self.hue,
            self.fade_level,
            self.reason.code()
        );
        if let Some(aura) = &self.aura {
            line.push_str(&format!(" | aura={}", aura.color_name));
        }
        if let Some(cmd) = &self.audio {
            line.push_str(&format!(" | audio={}", cmd));
        }
        line
    }
}
