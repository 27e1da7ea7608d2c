//! Reading phase definitions

use serde::{Deserialize, Serialize};

/// The four phases of a palm reading session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReadingPhase {
    /// No hand in view
    Idle,
    /// Hand visible but outside the reachable zone
    Detecting,
    /// Hand held steadily, accumulating toward the reveal
    Charging,
    /// Aura chosen; held until an explicit reset
    Revealed,
}

impl ReadingPhase {
    /// Get ANSI color code for terminal display
    pub fn color_code(&self) -> &'static str {
        match self {
            ReadingPhase::Idle => "\x1b[90m",      // Gray
            ReadingPhase::Detecting => "\x1b[36m", // Cyan
            ReadingPhase::Charging => "\x1b[33m",  // Yellow
            ReadingPhase::Revealed => "\x1b[35m",  // Magenta
        }
    }

    /// Reset ANSI color
    pub fn color_reset() -> &'static str {
        "\x1b[0m"
    }

    /// Get emoji for phase
    pub fn emoji(&self) -> &'static str {
        match self {
            ReadingPhase::Idle => "✋",
            ReadingPhase::Detecting => "👀",
            ReadingPhase::Charging => "🔮",
            ReadingPhase::Revealed => "✨",
        }
    }

    /// Prompt shown in the dialog box for this phase
    pub fn prompt(&self) -> &'static str {
        match self {
            ReadingPhase::Idle => "Show one of your hands to the camera for the aura reading.",
            ReadingPhase::Detecting => "Move your hand over the outline to start the reading.",
            ReadingPhase::Charging => "Hold still while your aura is read...",
            ReadingPhase::Revealed => "Click anywhere to read again.",
        }
    }

    /// Hand loss does not leave this phase
    pub fn is_sticky(&self) -> bool {
        matches!(self, ReadingPhase::Revealed)
    }
}

impl std::fmt::Display for ReadingPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ReadingPhase::Idle => "IDLE",
            ReadingPhase::Detecting => "DETECTING",
            ReadingPhase::Charging => "CHARGING",
            ReadingPhase::Revealed => "REVEALED",
        };
        write!(f, "{}", name)
    }
}
