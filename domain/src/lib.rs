//! Domain layer for ai-ogiri
//!
//! This crate contains the game rules, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Ogiri
//!
//! A comedic question-and-answer game. Several AI backends answer the same
//! topic in turn, each seeing the answers given so far, and a human judge
//! awards points to the answers they like.
//!
//! ## Rounds
//!
//! A round is complete once every selected backend has answered once (by
//! count). After [`MAX_ROUNDS`] rounds the game is over and the
//! [`ScoreLedger`] produces the final standings.

pub mod config;
pub mod core;
pub mod game;
pub mod prompt;
pub mod session;

// Re-export commonly used types
pub use config::OutputFormat;
pub use core::{backend::BackendId, error::DomainError, topic::Topic};
pub use game::{
    history::{ConversationHistory, Turn},
    ledger::{ScoreLedger, Standing},
    response::Response,
    schedule::{SelectionPolicy, TurnSchedule},
    state::{GamePhase, MAX_ROUNDS, RoundProgress, SessionState, Verdict},
};
pub use prompt::PromptTemplate;
pub use session::{
    entities::{Message, Role},
    stream::StreamEvent,
};
