//! Reason codes explaining each tick's outcome

use serde::{Deserialize, Serialize};

/// Reason codes for every state change and hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
pub enum ReasonCode {
    // =========================================================================
    // R001: Presence
    // =========================================================================
    /// No hand reported this frame
    R001_NO_HAND,
    /// Hand reported but outside the reachable zone
    R001_OUT_OF_ZONE,
    /// Detector not ready, tick ignored
    R001_NOT_READY,

    // =========================================================================
    // R002: Charging
    // =========================================================================
    /// Hand arrived, charge timer started
    R002_CHARGE_STARTED,
    /// Hand still present, charge accumulating
    R002_CHARGE_ACCUMULATING,
    /// Hand lost before the threshold, charge discarded
    R002_CHARGE_LOST,

    // =========================================================================
    // R003: Reveal
    // =========================================================================
    /// Threshold exceeded, aura chosen
    R003_REVEALED,
    /// Reveal held until reset
    R003_REVEAL_HELD,

    // =========================================================================
    // R004: External
    // =========================================================================
    /// Explicit reset
    R004_RESET,
}

impl ReasonCode {
    /// Get the code string (for logging)
    pub fn code(&self) -> &'static str {
        match self {
            Self::R001_NO_HAND => "R001_NO_HAND",
            Self::R001_OUT_OF_ZONE => "R001_OUT_OF_ZONE",
            Self::R001_NOT_READY => "R001_NOT_READY",
            Self::R002_CHARGE_STARTED => "R002_CHARGE_STARTED",
            Self::R002_CHARGE_ACCUMULATING => "R002_CHARGE_ACCUMULATING",
            Self::R002_CHARGE_LOST => "R002_CHARGE_LOST",
            Self::R003_REVEALED => "R003_REVEALED",
            Self::R003_REVEAL_HELD => "R003_REVEAL_HELD",
            Self::R004_RESET => "R004_RESET",
        }
    }

    /// Get human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::R001_NO_HAND => "No hand in view",
            Self::R001_OUT_OF_ZONE => "Hand outside the reading zone",
            Self::R001_NOT_READY => "Detector not ready",
            Self::R002_CHARGE_STARTED => "Reading started",
            Self::R002_CHARGE_ACCUMULATING => "Reading in progress",
            Self::R002_CHARGE_LOST => "Hand lost - reading cancelled",
            Self::R003_REVEALED => "Aura revealed",
            Self::R003_REVEAL_HELD => "Aura shown until reset",
            Self::R004_RESET => "Session reset",
        }
    }

    /// Did the phase change on this tick?
    pub fn is_transition(&self) -> bool {
        matches!(
            self,
            Self::R002_CHARGE_STARTED | Self::R002_CHARGE_LOST | Self::R003_REVEALED | Self::R004_RESET
        )
    }
}

impl std::fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.description())
    }
}
