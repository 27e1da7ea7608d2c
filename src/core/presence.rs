//! Presence gate: turns detector output into a per-frame presence signal
//!
//! Without a zone every detected hand counts. With a zone, a hand counts
//! only if its mean horizontal position falls inside the band.

use crate::config::ZoneBand;
use crate::types::{Frame, HandDetection};

/// Result of assessing one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Detector reported no hands
    Absent,
    /// Hands reported, none inside the zone
    OutOfZone,
    /// At least one hand counts
    Present,
}

/// Zone-aware presence check
#[derive(Debug, Clone, Copy, Default)]
pub struct PresenceGate {
    zone: Option<ZoneBand>,
}

impl PresenceGate {
    pub fn new(zone: Option<ZoneBand>) -> Self {
        Self { zone }
    }

    pub fn zone(&self) -> Option<ZoneBand> {
        self.zone
    }

    /// Classify a frame
    pub fn assess(&self, frame: &Frame) -> Presence {
        if frame.hands.is_empty() {
            return Presence::Absent;
        }
        if self.tracked_hand(frame).is_some() {
            Presence::Present
        } else {
            Presence::OutOfZone
        }
    }

    /// First hand that counts toward the reading
    pub fn tracked_hand<'a>(&self, frame: &'a Frame) -> Option<&'a HandDetection> {
        match self.zone {
            None => frame.hands.first(),
            Some(zone) => frame.hands.iter().find(|hand| {
                frame
                    .horizontal_fraction(hand)
                    .map(|f| zone.contains(f))
                    .unwrap_or(false)
            }),
        }
    }
}
