//! Error types
//!
//! None of these end a run. Collaborator errors are turned into notices by
//! the engine; settings errors fall back to defaults.

use thiserror::Error;

/// Score submission failed
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("score rejected: {0}")]
    Rejected(String),
    #[error("score service unreachable: {0}")]
    Unreachable(String),
}

/// Best score could not be read or written
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("best score storage unavailable")]
    Unavailable,
    #[error("best score io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("best score data is corrupt: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Settings could not be loaded
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}
