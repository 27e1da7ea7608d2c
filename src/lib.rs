//! palm-aura: palm-presence state machine and timed aura reveal
//!
//! A hand-landmark detector reports hands each frame; once a hand is held
//! for the reveal threshold a random aura is revealed and its ambient track
//! started. Rendering and audio playback stay with the caller.

pub mod config;
pub mod core;
pub mod error;
pub mod types;

pub use error::{AuraError, Result};

// =============================================================================
// TIMING
// =============================================================================

/// Continuous detection required before the aura is revealed (milliseconds)
pub const REVEAL_THRESHOLD_MS: u64 = 5000;

/// Frame period used by the simulator (~60fps)
pub const SIMULATED_FRAME_MS: u64 = 16;

// =============================================================================
// ZONE GATE - fractions of frame width
// =============================================================================

/// Left edge of the reachable band used by the gated variant
pub const ZONE_MIN_FRACTION: f64 = 0.05;

/// Right edge of the reachable band used by the gated variant
pub const ZONE_MAX_FRACTION: f64 = 0.75;

// =============================================================================
// FADE - video opacity while charging
// =============================================================================

/// Baseline opacity when no reading is in progress
pub const FADE_MIN: f64 = 50.0;

/// Fully opaque
pub const FADE_MAX: f64 = 255.0;

/// Opacity gained per charging tick
pub const FADE_STEP: f64 = 2.0;

// =============================================================================
// AUDIO
// =============================================================================

/// Loop volume for playtime, love and dark tracks
pub const DEFAULT_TRACK_VOLUME: f32 = 0.3;

/// Calm track plays louder
pub const CALM_TRACK_VOLUME: f32 = 0.5;

// =============================================================================
// HAND GEOMETRY
// =============================================================================

/// Landmarks per hand detection
pub const LANDMARK_COUNT: usize = 21;

/// Halo diameter relative to hand width
pub const HALO_SCALE: f64 = 1.7;

/// Opacity of the aura circle fill
pub const HALO_ALPHA: u8 = 150;

// =============================================================================
// VERSION
// =============================================================================

pub const VERSION: &str = "1.0.0";
