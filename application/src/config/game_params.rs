//! Game parameters: use case loop control.
//!
//! [`GameParams`] groups the static parameters that control how a game is
//! played: the system prompt handed to every backend, the batch schedule
//! length and the per-call deadline. These are application-layer concerns,
//! not domain policy.

use ogiri_domain::{MAX_ROUNDS, PromptTemplate};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Game loop control parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameParams {
    /// System prompt sent to every backend.
    pub system_prompt: String,
    /// How many times each backend appears in the batch schedule.
    /// Also the number of rounds in a batch game.
    pub turns_per_backend: usize,
    /// Deadline for a single backend call (`None` waits forever).
    pub call_timeout: Option<Duration>,
}

impl Default for GameParams {
    fn default() -> Self {
        Self {
            system_prompt: PromptTemplate::default_system().to_string(),
            turns_per_backend: MAX_ROUNDS as usize,
            call_timeout: Some(Duration::from_secs(120)),
        }
    }
}

impl GameParams {
    // ==================== Builder Methods ====================

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_turns_per_backend(mut self, turns: usize) -> Self {
        self.turns_per_backend = turns.max(1);
        self
    }

    pub fn with_call_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Set the call deadline from seconds; `None` disables it.
    pub fn with_timeout_seconds(self, seconds: Option<u64>) -> Self {
        self.with_call_timeout(seconds.map(Duration::from_secs))
    }
}
