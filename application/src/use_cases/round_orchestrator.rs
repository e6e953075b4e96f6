//! Round orchestrator
//!
//! Picks who answers next, drives one backend call at a time (with a
//! deadline and a cancellation token), and records successful answers in
//! the [`SessionState`]. Failed attempts leave the session untouched.

use crate::config::GameParams;
use crate::ports::answer_backend::{AnswerBackend, AnswerRequest, GatewayError, GenerationError};
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::progress::GameProgressNotifier;
use ogiri_domain::{
    BackendId, DomainError, GamePhase, Response, RoundProgress, SelectionPolicy, SessionState,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors that stop the orchestrator from attempting a turn at all
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrchestratorError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("No backend left to pick")]
    NoBackendAvailable,
}

/// Result of one attempted turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// An answer was generated and recorded
    Answered {
        response: Response,
        progress: RoundProgress,
    },
    /// The backend failed; nothing was recorded
    Failed(GenerationError),
}

/// Backends available to a game, keyed by id
///
/// A backend that could not be constructed (missing key, bad config) is
/// kept as "unavailable" with a reason, so picking it fails that turn
/// only.
#[derive(Clone, Default)]
pub struct BackendRoster {
    backends: HashMap<BackendId, Arc<dyn AnswerBackend>>,
    unavailable: HashMap<BackendId, String>,
}

impl BackendRoster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_backend(mut self, backend: Arc<dyn AnswerBackend>) -> Self {
        self.insert(backend);
        self
    }

    pub fn insert(&mut self, backend: Arc<dyn AnswerBackend>) {
        let id = backend.id();
        self.unavailable.remove(&id);
        self.backends.insert(id, backend);
    }

    pub fn mark_unavailable(&mut self, id: BackendId, reason: impl Into<String>) {
        self.backends.remove(&id);
        self.unavailable.insert(id, reason.into());
    }

    /// Look up a backend, or the configuration error that disabled it
    pub fn get(&self, id: BackendId) -> Result<&Arc<dyn AnswerBackend>, GatewayError> {
        self.backends.get(&id).ok_or_else(|| {
            let reason = self
                .unavailable
                .get(&id)
                .cloned()
                .unwrap_or_else(|| format!("backend {} is not configured", id));
            GatewayError::Configuration(reason)
        })
    }

    pub fn is_available(&self, id: BackendId) -> bool {
        self.backends.contains_key(&id)
    }

    /// Reasons for every backend that could not be set up
    pub fn unavailable(&self) -> impl Iterator<Item = (BackendId, &str)> {
        self.unavailable.iter().map(|(id, r)| (*id, r.as_str()))
    }

    pub fn display_name(&self, id: BackendId) -> String {
        self.backends
            .get(&id)
            .map(|b| b.display_name().to_string())
            .unwrap_or_else(|| id.default_display_name().to_string())
    }
}

/// Coordinates turns between backends for one session
pub struct RoundOrchestrator<R: Rng + Send = StdRng> {
    roster: BackendRoster,
    policy: SelectionPolicy,
    total_turns: Option<usize>,
    turns_started: usize,
    rng: R,
    params: GameParams,
    cancel: CancellationToken,
    logger: Arc<dyn ConversationLogger>,
}

impl RoundOrchestrator<StdRng> {
    /// Create an orchestrator seeded from the OS
    pub fn new(roster: BackendRoster, policy: SelectionPolicy, params: GameParams) -> Self {
        Self::with_rng(roster, policy, params, StdRng::from_entropy())
    }
}

impl<R: Rng + Send> RoundOrchestrator<R> {
    pub fn with_rng(
        roster: BackendRoster,
        policy: SelectionPolicy,
        params: GameParams,
        rng: R,
    ) -> Self {
        let total_turns = policy.remaining();
        Self {
            roster,
            policy,
            total_turns,
            turns_started: 0,
            rng,
            params,
            cancel: CancellationToken::new(),
            logger: Arc::new(NoConversationLogger),
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn roster(&self) -> &BackendRoster {
        &self.roster
    }

    pub fn params(&self) -> &GameParams {
        &self.params
    }

    pub fn logger(&self) -> &Arc<dyn ConversationLogger> {
        &self.logger
    }

    pub fn set_system_prompt(&mut self, prompt: impl Into<String>) {
        self.params.system_prompt = prompt.into();
    }

    /// Replace the selection policy and restart turn numbering
    pub fn set_policy(&mut self, policy: SelectionPolicy) {
        self.total_turns = policy.remaining();
        self.policy = policy;
        self.turns_started = 0;
    }

    /// Turns attempted since the last policy change, failed ones included
    pub fn turns_started(&self) -> usize {
        self.turns_started
    }

    /// Turns left in a scheduled policy
    pub fn turns_remaining(&self) -> Option<usize> {
        self.policy.remaining()
    }

    /// Pick the next speaker according to the policy
    pub fn next_backend(&mut self, session: &SessionState) -> Option<BackendId> {
        self.policy.next_backend(session.backends(), &mut self.rng)
    }

    /// Pick a backend, generate its answer and record it.
    ///
    /// A generation failure is returned as [`TurnOutcome::Failed`] and
    /// leaves the session unchanged, so the next call makes a fresh pick.
    pub async fn play_turn(
        &mut self,
        session: &mut SessionState,
        progress: &dyn GameProgressNotifier,
    ) -> Result<TurnOutcome, OrchestratorError> {
        ensure_can_generate(session)?;
        let backend = self
            .next_backend(session)
            .ok_or(OrchestratorError::NoBackendAvailable)?;

        let generated = match self.generate_turn(session, backend, progress).await {
            Ok(response) => response,
            Err(e) => return Ok(TurnOutcome::Failed(e)),
        };

        let round_progress = session.record_answer(backend, generated.content.clone())?;
        if round_progress.round_completed {
            progress.on_round_complete(round_progress.round);
        }
        Ok(TurnOutcome::Answered {
            response: generated,
            progress: round_progress,
        })
    }

    /// Generate one answer from `backend` without touching the session.
    ///
    /// Callers check [`ensure_can_generate`] first; the answer is
    /// recorded by the caller once it has been judged.
    pub async fn generate_turn(
        &mut self,
        session: &SessionState,
        backend: BackendId,
        progress: &dyn GameProgressNotifier,
    ) -> Result<Response, GenerationError> {
        self.turns_started += 1;
        let display_name = self.roster.display_name(backend);
        let round = session.current_round();
        progress.on_turn_start(
            round,
            self.turns_started,
            self.total_turns,
            backend,
            &display_name,
        );
        debug!(
            backend = %backend,
            round,
            turn = self.turns_started,
            "Requesting answer"
        );

        let result = self.call_backend(session, backend, &display_name, progress).await;

        match &result {
            Ok(response) => {
                info!(backend = %backend, round, "Answer received");
                progress.on_turn_complete(response);
                self.logger.log(ConversationEvent::new(
                    "answer",
                    serde_json::json!({
                        "backend": backend.as_str(),
                        "round": round,
                        "content": response.content,
                    }),
                ));
            }
            Err(e) => {
                warn!(backend = %backend, round, error = %e.source, "Answer generation failed");
                progress.on_turn_failed(e);
                self.logger.log(ConversationEvent::new(
                    "generation_failed",
                    serde_json::json!({
                        "backend": backend.as_str(),
                        "round": round,
                        "error": e.source.to_string(),
                    }),
                ));
            }
        }
        result
    }

    async fn call_backend(
        &self,
        session: &SessionState,
        backend: BackendId,
        display_name: &str,
        progress: &dyn GameProgressNotifier,
    ) -> Result<Response, GenerationError> {
        let fail = |source: GatewayError| GenerationError::new(backend, display_name, source);

        let client = self.roster.get(backend).map_err(fail)?;
        let Some(topic) = session.topic() else {
            return Err(fail(GatewayError::Configuration(
                "no topic has been set".to_string(),
            )));
        };
        let request = AnswerRequest {
            system_prompt: &self.params.system_prompt,
            topic,
            history: session.history(),
            round: session.current_round(),
        };

        let mut on_partial = |text: &str| progress.on_answer_partial(backend, text);
        let generation = client.generate(&request, &mut on_partial);

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(fail(GatewayError::Cancelled)),
            result = with_deadline(self.params.call_timeout, generation) => {
                result.unwrap_or_else(|secs| Err(fail(GatewayError::Timeout(secs))))
            }
        }
    }
}

/// Fail unless the session is ready for a new answer
pub fn ensure_can_generate(session: &SessionState) -> Result<(), DomainError> {
    match session.phase() {
        GamePhase::Generating => Ok(()),
        GamePhase::GameOver => Err(DomainError::GameOver),
        other => Err(DomainError::InvalidTransition(other.as_str())),
    }
}

/// Await `fut`, giving up after `deadline` (returns the deadline in seconds)
async fn with_deadline<F: Future>(deadline: Option<Duration>, fut: F) -> Result<F::Output, u64> {
    match deadline {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| limit.as_secs()),
        None => Ok(fut.await),
    }
}
