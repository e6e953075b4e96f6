//! Progress notification port
//!
//! Defines the interface for reporting what happens during a game.

use crate::ports::answer_backend::GenerationError;
use ogiri_domain::{BackendId, Response, Standing, Topic};

/// Callback for progress updates during a game
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (streaming console, spinner, etc.)
pub trait GameProgressNotifier: Send + Sync {
    /// Called once the topic is fixed and play begins
    fn on_game_start(&self, _topic: &Topic, _backends: &[BackendId]) {}

    /// Called when a backend is picked and about to answer
    ///
    /// `turn` is 1-based; `total_turns` is known only for scheduled play.
    fn on_turn_start(
        &self,
        round: u32,
        turn: usize,
        total_turns: Option<usize>,
        backend: BackendId,
        display_name: &str,
    );

    /// Called with the accumulated answer text after every streamed chunk
    fn on_answer_partial(&self, backend: BackendId, text_so_far: &str);

    /// Called when an answer finished streaming
    fn on_turn_complete(&self, response: &Response);

    /// Called when an answer could not be generated
    fn on_turn_failed(&self, error: &GenerationError);

    /// Called when every backend has answered in a round
    fn on_round_complete(&self, _round: u32) {}

    /// Called when the game ends
    fn on_game_over(&self, _standings: &[Standing]) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl GameProgressNotifier for NoProgress {
    fn on_turn_start(
        &self,
        _round: u32,
        _turn: usize,
        _total_turns: Option<usize>,
        _backend: BackendId,
        _display_name: &str,
    ) {
    }
    fn on_answer_partial(&self, _backend: BackendId, _text_so_far: &str) {}
    fn on_turn_complete(&self, _response: &Response) {}
    fn on_turn_failed(&self, _error: &GenerationError) {}
}
