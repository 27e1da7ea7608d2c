//! Error types for palm-aura

use thiserror::Error;

/// Errors raised outside the per-frame path.
///
/// Ticking the state machine never fails; these cover configuration,
/// frame scripts and the I/O around them.
#[derive(Error, Debug)]
pub enum AuraError {
    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed frame script line
    #[error("Script error on line {line}: {message}")]
    Script { line: usize, message: String },

    /// IO error (reading config or script files)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AuraError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn script(line: usize, message: impl Into<String>) -> Self {
        Self::Script {
            line,
            message: message.into(),
        }
    }

    /// Is this a caller mistake (as opposed to an environment failure)?
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Script { .. } | Self::Json(_))
    }
}

pub type Result<T> = std::result::Result<T, AuraError>;
