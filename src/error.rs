use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TexPilotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Failure reported by the typesetting or rendering engine.
    /// The message is kept verbatim for classification and is never shown to users.
    #[error("Engine error: {0}")]
    Engine(String),

    #[error("conversion timed out after {} ms", .0.as_millis())]
    Timeout(Duration),

    #[error("Failed to resolve collaborator '{name}': {message}")]
    Registry { name: String, message: String },

    #[error("Presentation error: {0}")]
    Presentation(String),

    #[error("Announcement error: {0}")]
    Announcement(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Integration check failed: {0}")]
    Integration(String),
}

impl TexPilotError {
    pub fn engine(message: impl Into<String>) -> Self {
        Self::Engine(message.into())
    }

    /// Raw failure text used for classification.
    ///
    /// Engine failures yield the engine's own text without the crate prefix.
    pub fn raw_message(&self) -> String {
        match self {
            Self::Engine(message) => message.clone(),
            other => other.to_string(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

pub type Result<T> = std::result::Result<T, TexPilotError>;
