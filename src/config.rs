//! Reading configuration
//!
//! Defaults come from the constants in the crate root. A JSON file may
//! override any subset of fields; missing fields keep their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AuraError, Result};
use crate::types::SoundTrack;
use crate::{
    CALM_TRACK_VOLUME, DEFAULT_TRACK_VOLUME, FADE_MAX, FADE_MIN, FADE_STEP,
    REVEAL_THRESHOLD_MS, ZONE_MAX_FRACTION, ZONE_MIN_FRACTION,
};

/// Horizontal band (fractions of frame width) a hand must sit in to count
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneBand {
    pub min: f64,
    pub max: f64,
}

impl ZoneBand {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Inclusive on both edges
    pub fn contains(&self, fraction: f64) -> bool {
        fraction >= self.min && fraction <= self.max
    }

    /// Parse `"0.05,0.75"`
    pub fn parse(s: &str) -> Result<Self> {
        let (lo, hi) = s
            .split_once(',')
            .ok_or_else(|| AuraError::config(format!("zone '{}' must be <min>,<max>", s)))?;
        let parse = |v: &str| {
            v.trim()
                .parse::<f64>()
                .map_err(|_| AuraError::config(format!("zone bound '{}' is not a number", v.trim())))
        };
        let band = Self::new(parse(lo)?, parse(hi)?);
        band.validate()?;
        Ok(band)
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.min) || !(0.0..=1.0).contains(&self.max) {
            return Err(AuraError::config("zone bounds must lie in [0, 1]"));
        }
        if self.min >= self.max {
            return Err(AuraError::config("zone min must be below zone max"));
        }
        Ok(())
    }
}

impl Default for ZoneBand {
    fn default() -> Self {
        Self::new(ZONE_MIN_FRACTION, ZONE_MAX_FRACTION)
    }
}

/// Opacity ramp applied while charging
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FadeConfig {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl Default for FadeConfig {
    fn default() -> Self {
        Self {
            min: FADE_MIN,
            max: FADE_MAX,
            step: FADE_STEP,
        }
    }
}

/// Loop volume per ambient track
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackVolumes {
    pub playtime: f32,
    pub love: f32,
    pub dark: f32,
    pub calm: f32,
}

impl TrackVolumes {
    pub fn for_track(&self, track: SoundTrack) -> f32 {
        match track {
            SoundTrack::Playtime => self.playtime,
            SoundTrack::Love => self.love,
            SoundTrack::Dark => self.dark,
            SoundTrack::Calm => self.calm,
        }
    }
}

impl Default for TrackVolumes {
    fn default() -> Self {
        Self {
            playtime: DEFAULT_TRACK_VOLUME,
            love: DEFAULT_TRACK_VOLUME,
            dark: DEFAULT_TRACK_VOLUME,
            calm: CALM_TRACK_VOLUME,
        }
    }
}

/// Full configuration of one reading session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadingConfig {
    /// Continuous detection required before reveal (ms)
    pub reveal_threshold_ms: u64,
    /// Optional reachable band; `None` counts any detected hand
    pub zone: Option<ZoneBand>,
    pub fade: FadeConfig,
    pub volumes: TrackVolumes,
}

impl Default for ReadingConfig {
    fn default() -> Self {
        Self {
            reveal_threshold_ms: REVEAL_THRESHOLD_MS,
            zone: None,
            fade: FadeConfig::default(),
            volumes: TrackVolumes::default(),
        }
    }
}

impl ReadingConfig {
    /// The gated variant: 2 second reveal, hand must sit in the default band
    pub fn gated() -> Self {
        Self {
            reveal_threshold_ms: 2000,
            zone: Some(ZoneBand::default()),
            ..Self::default()
        }
    }

    pub fn with_threshold(mut self, ms: u64) -> Self {
        self.reveal_threshold_ms = ms;
        self
    }

    pub fn with_zone(mut self, zone: ZoneBand) -> Self {
        self.zone = Some(zone);
        self
    }

    /// Load from a JSON file and validate
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.reveal_threshold_ms == 0 {
            return Err(AuraError::config("reveal_threshold_ms must be positive"));
        }
        if let Some(zone) = &self.zone {
            zone.validate()?;
        }
        if self.fade.min > self.fade.max {
            return Err(AuraError::config("fade.min must not exceed fade.max"));
        }
        if self.fade.step < 0.0 {
            return Err(AuraError::config("fade.step must not be negative"));
        }
        for track in SoundTrack::ALL {
            let volume = self.volumes.for_track(track);
            if !(0.0..=1.0).contains(&volume) {
                return Err(AuraError::config(format!(
                    "volume for {} must lie in [0, 1], got {}",
                    track, volume
                )));
            }
        }
        Ok(())
    }
}
