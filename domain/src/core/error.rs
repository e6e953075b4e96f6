//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("No backends selected for the game")]
    NoBackends,

    #[error("Topic cannot be empty")]
    EmptyTopic,

    #[error("Unknown backend: {0}")]
    UnknownBackend(String),

    #[error("Backend {0} is not part of this game")]
    BackendNotInGame(String),

    #[error("A game is already in progress; reset before changing {0}")]
    GameInProgress(&'static str),

    #[error("Action not allowed while {0}")]
    InvalidTransition(&'static str),

    #[error("Game is over")]
    GameOver,
}

impl DomainError {
    /// Check if this error means the game has already finished
    pub fn is_game_over(&self) -> bool {
        matches!(self, DomainError::GameOver)
    }
}
