//! Coordinator errors.

use thiserror::Error;

/// Internal coordinator failures.
#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("protocol error: {0}")]
    Protocol(#[from] stagecast_protocol::ProtocolError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Client-visible command rejections.
///
/// These never abort the coordinator; their `Display` strings are carried
/// back to the caller in the acknowledgment's error field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unsupported technology: {0}")]
    UnsupportedTechnology(String),

    #[error("invalid transition: {0}")]
    InvalidTransition(&'static str),

    #[error("only the presenter may issue session commands")]
    NotPresenter,
}
