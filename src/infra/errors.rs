// src/infra/errors.rs — Error types for ticketpilot

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SupportError {
    // Generator errors (degrade to the rule-based fallback)
    #[error("Generator '{provider}' error: {message}")]
    Provider {
        provider: String,
        message: String,
        retriable: bool,
    },

    #[error("Generator '{provider}' timed out after {timeout_secs}s")]
    Timeout { provider: String, timeout_secs: u64 },

    // Model errors
    #[error("Classifier error: {0}")]
    Classifier(String),

    // Lookups
    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    // Infra
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SupportError {
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            SupportError::Provider {
                retriable: true,
                ..
            } | SupportError::Timeout { .. }
        )
    }
}
