//! Application layer for ai-ogiri
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::GameParams;
pub use ports::{
    answer_backend::{AnswerBackend, AnswerRequest, GatewayError, GenerationError, StreamHandle},
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    judge::{AutoSkipJudge, JudgeError, JudgePort},
    progress::{GameProgressNotifier, NoProgress},
};
pub use use_cases::interactive::InteractiveGame;
pub use use_cases::round_orchestrator::{
    BackendRoster, OrchestratorError, RoundOrchestrator, TurnOutcome, ensure_can_generate,
};
pub use use_cases::run_batch::{
    BatchGameResult, BatchOutcome, RunBatchGameError, RunBatchGameInput, RunBatchGameUseCase,
};
