//! Core modules for palm-aura

pub mod presence;
pub mod reading;
pub mod audio;
pub mod session;
pub mod script;
pub mod api;

pub use presence::{Presence, PresenceGate};
pub use reading::{ReadingEngine, hue_for_progress, seed_from_phrase};
pub use audio::{AudioPlayer, CommandQueue, LogPlayer};
pub use session::ReadingSession;
pub use script::{ScriptAction, ScriptEvent, parse_script, simulate_hold};
pub use api::{create_router, router_with_state, run_server, AppState};
