//! Core types for palm-aura

mod phase;
mod aura;
mod landmark;
mod reason;
mod output;

pub use phase::ReadingPhase;
pub use aura::{AuraProfile, SoundTrack, AURA_CATALOG};
pub use landmark::{Landmark, HandDetection, Frame, AuraHalo};
pub use reason::ReasonCode;
pub use output::{FrameOutput, AuraSummary, AudioCommand};
