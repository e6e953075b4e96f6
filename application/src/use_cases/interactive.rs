//! Interactive game use case
//!
//! Drives a session one user action at a time: submit a topic, request the
//! next answer, rule on it, and reset or reconfigure between games.
//! Speakers are picked uniformly at random on every turn.

use crate::config::GameParams;
use crate::ports::conversation_logger::{ConversationEvent, ConversationLogger};
use crate::ports::progress::GameProgressNotifier;
use crate::use_cases::round_orchestrator::{
    BackendRoster, OrchestratorError, RoundOrchestrator, TurnOutcome,
};
use ogiri_domain::{
    BackendId, DomainError, GamePhase, Response, SelectionPolicy, SessionState, Standing, Topic,
    Verdict,
};
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// A long-lived interactive session
pub struct InteractiveGame<R: Rng + Send = StdRng> {
    session: SessionState,
    orchestrator: RoundOrchestrator<R>,
}

impl InteractiveGame<StdRng> {
    pub fn new(
        backends: &[BackendId],
        roster: BackendRoster,
        params: GameParams,
        seed: Option<u64>,
    ) -> Result<Self, DomainError> {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(backends, roster, params, rng)
    }
}

impl<R: Rng + Send> InteractiveGame<R> {
    pub fn with_rng(
        backends: &[BackendId],
        roster: BackendRoster,
        params: GameParams,
        rng: R,
    ) -> Result<Self, DomainError> {
        let session = SessionState::new(backends)?;
        let orchestrator = RoundOrchestrator::with_rng(roster, SelectionPolicy::Random, params, rng);
        Ok(Self {
            session,
            orchestrator,
        })
    }

    pub fn with_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.orchestrator = self.orchestrator.with_logger(logger);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.orchestrator = self.orchestrator.with_cancellation(token);
        self
    }

    // ==================== Queries ====================

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn phase(&self) -> GamePhase {
        self.session.phase()
    }

    pub fn standings(&self) -> Vec<Standing> {
        self.session.standings()
    }

    pub fn roster(&self) -> &BackendRoster {
        self.orchestrator.roster()
    }

    pub fn system_prompt(&self) -> &str {
        &self.orchestrator.params().system_prompt
    }

    pub fn display_name(&self, backend: BackendId) -> String {
        self.orchestrator.roster().display_name(backend)
    }

    // ==================== Actions ====================

    /// Start a game on `text`
    pub fn submit_topic(&mut self, text: &str) -> Result<(), DomainError> {
        let topic = Topic::new(text)?;
        self.session.submit_topic(topic.clone())?;
        info!("Topic set: {}", topic);
        self.log(
            "game_started",
            serde_json::json!({
                "topic": topic.content(),
                "backends": self.session.backends().iter().map(|b| b.as_str()).collect::<Vec<_>>(),
                "mode": "interactive",
            }),
        );
        Ok(())
    }

    /// Ask a randomly picked backend for the next answer.
    ///
    /// A failed generation leaves the session unchanged; calling again
    /// retries with a fresh pick.
    pub async fn next_answer(
        &mut self,
        progress: &dyn GameProgressNotifier,
    ) -> Result<TurnOutcome, OrchestratorError> {
        let outcome = self.orchestrator.play_turn(&mut self.session, progress).await?;
        if let TurnOutcome::Answered { progress: round, .. } = &outcome
            && round.game_over
        {
            self.finish(progress);
        }
        Ok(outcome)
    }

    /// Rule on the pending answer
    ///
    /// Returns the scored answer for award/skip, `None` for end-game.
    pub fn apply_verdict(
        &mut self,
        verdict: Verdict,
        progress: &dyn GameProgressNotifier,
    ) -> Result<Option<Response>, DomainError> {
        let scored = self.session.apply_verdict(verdict)?;
        let (backend, round) = scored
            .as_ref()
            .map(|r| (Some(r.backend.as_str()), r.round))
            .unwrap_or((None, self.session.current_round()));
        self.log(
            "verdict",
            serde_json::json!({
                "backend": backend,
                "round": round,
                "verdict": verdict,
                "points": verdict.points(),
            }),
        );
        if self.session.is_game_over() {
            self.finish(progress);
        }
        Ok(scored)
    }

    /// Clear everything and wait for a new topic
    pub fn reset(&mut self) {
        self.session.reset();
        self.orchestrator.set_policy(SelectionPolicy::Random);
        info!("Session reset");
    }

    /// Replace the system prompt; only between games
    pub fn set_system_prompt(&mut self, prompt: impl Into<String>) -> Result<(), DomainError> {
        if self.session.in_progress() {
            return Err(DomainError::GameInProgress("the system prompt"));
        }
        self.orchestrator.set_system_prompt(prompt);
        Ok(())
    }

    /// Replace the backend set; only between games. Starts a fresh session.
    pub fn select_backends(&mut self, backends: &[BackendId]) -> Result<(), DomainError> {
        self.session.change_backends(backends)?;
        self.orchestrator.set_policy(SelectionPolicy::Random);
        info!("Backends changed: {:?}", self.session.backends());
        Ok(())
    }

    fn finish(&self, progress: &dyn GameProgressNotifier) {
        let standings = self.session.standings();
        self.log(
            "game_finished",
            serde_json::json!({
                "standings": standings
                    .iter()
                    .map(|s| serde_json::json!({"backend": s.backend.as_str(), "points": s.points}))
                    .collect::<Vec<_>>(),
            }),
        );
        progress.on_game_over(&standings);
    }

    fn log(&self, event_type: &'static str, payload: serde_json::Value) {
        self.orchestrator
            .logger()
            .log(ConversationEvent::new(event_type, payload));
    }
}
