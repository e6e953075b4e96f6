//! Run Batch Game use case
//!
//! Plays one unattended game: a fixed, shuffled schedule in which every
//! backend answers the same number of times, with the judge consulted
//! after each answer before it is recorded.

use crate::config::GameParams;
use crate::ports::answer_backend::GenerationError;
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger,
};
use crate::ports::judge::{JudgeError, JudgePort};
use crate::ports::progress::{GameProgressNotifier, NoProgress};
use crate::use_cases::round_orchestrator::{BackendRoster, RoundOrchestrator};
use ogiri_domain::{
    BackendId, DomainError, Response, SelectionPolicy, SessionState, Standing, Topic,
    TurnSchedule, Verdict,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors that prevent a batch game from starting
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RunBatchGameError {
    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Input for the RunBatchGame use case
#[derive(Debug, Clone)]
pub struct RunBatchGameInput {
    pub topic: Topic,
    /// Selected backends, in configuration order
    pub backends: Vec<BackendId>,
    /// Fixed seed for the shuffle (reproducible runs)
    pub seed: Option<u64>,
}

impl RunBatchGameInput {
    pub fn new(topic: Topic, backends: Vec<BackendId>) -> Self {
        Self {
            topic,
            backends,
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }
}

/// How the batch game ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    /// The schedule ran out or the judge ended the game
    Completed,
    /// Cancelled by the user (Ctrl-C)
    Interrupted,
    /// The judge's input failed; results so far are still valid
    Aborted(JudgeError),
}

/// Everything the results screen needs
#[derive(Debug, Clone)]
pub struct BatchGameResult {
    pub topic: Topic,
    /// Recorded answers, in order, with their points
    pub answers: Vec<Response>,
    /// Final standings, highest first
    pub standings: Vec<Standing>,
    pub outcome: BatchOutcome,
    /// Turns that produced no answer
    pub failed_turns: Vec<GenerationError>,
}

impl BatchGameResult {
    /// Answers that earned at least one point
    pub fn point_answers(&self) -> impl Iterator<Item = &Response> {
        self.answers.iter().filter(|r| r.earned_points())
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self.outcome, BatchOutcome::Aborted(_))
    }
}

/// Use case for playing a batch (command-line) game
pub struct RunBatchGameUseCase {
    roster: BackendRoster,
    judge: Arc<dyn JudgePort>,
    params: GameParams,
    cancel: CancellationToken,
    logger: Arc<dyn ConversationLogger>,
}

impl RunBatchGameUseCase {
    pub fn new(roster: BackendRoster, judge: Arc<dyn JudgePort>, params: GameParams) -> Self {
        Self {
            roster,
            judge,
            params,
            cancel: CancellationToken::new(),
            logger: Arc::new(NoConversationLogger),
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn with_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(
        &self,
        input: RunBatchGameInput,
    ) -> Result<BatchGameResult, RunBatchGameError> {
        self.execute_with_progress(input, &NoProgress).await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress(
        &self,
        input: RunBatchGameInput,
        progress: &dyn GameProgressNotifier,
    ) -> Result<BatchGameResult, RunBatchGameError> {
        let turns = self.params.turns_per_backend.max(1);
        let max_rounds = u32::try_from(turns).unwrap_or(u32::MAX);
        let mut session = SessionState::new(&input.backends)?.with_max_rounds(max_rounds);
        session.submit_topic(input.topic.clone())?;

        let mut rng = match input.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let schedule = TurnSchedule::shuffled(session.backends(), turns, &mut rng);
        debug!(order = ?schedule.iter().collect::<Vec<_>>(), "Turn schedule");

        let mut orchestrator = RoundOrchestrator::with_rng(
            self.roster.clone(),
            SelectionPolicy::Scheduled(schedule),
            self.params.clone(),
            rng,
        )
        .with_cancellation(self.cancel.clone())
        .with_logger(Arc::clone(&self.logger));

        info!(
            "Starting batch game with {} backends, {} turns each",
            session.backends().len(),
            turns
        );
        self.logger.log(ConversationEvent::new(
            "game_started",
            serde_json::json!({
                "topic": input.topic.content(),
                "backends": session.backends().iter().map(|b| b.as_str()).collect::<Vec<_>>(),
                "mode": "batch",
            }),
        ));
        progress.on_game_start(&input.topic, session.backends());

        let mut failed_turns = Vec::new();
        let outcome = loop {
            if self.cancel.is_cancelled() {
                break BatchOutcome::Interrupted;
            }
            if session.is_game_over() {
                break BatchOutcome::Completed;
            }
            let Some(backend) = orchestrator.next_backend(&session) else {
                break BatchOutcome::Completed;
            };

            let response = match orchestrator.generate_turn(&session, backend, progress).await {
                Ok(response) => response,
                Err(e) if e.is_cancelled() => break BatchOutcome::Interrupted,
                Err(e) => {
                    failed_turns.push(e);
                    continue;
                }
            };

            let display_name = orchestrator.roster().display_name(backend);
            let judged = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => Err(JudgeError::Cancelled),
                verdict = self.judge.judge(&response, &display_name) => verdict,
            };
            let verdict = match judged {
                Ok(verdict) => verdict,
                Err(JudgeError::Cancelled) => break BatchOutcome::Interrupted,
                Err(e) => {
                    warn!("Judge failed: {}", e);
                    break BatchOutcome::Aborted(e);
                }
            };

            let round = session.record_judged_answer(
                backend,
                response.content,
                verdict == Verdict::Award,
            )?;
            self.logger.log(ConversationEvent::new(
                "verdict",
                serde_json::json!({
                    "backend": backend.as_str(),
                    "round": round.round,
                    "verdict": verdict,
                    "points": verdict.points(),
                }),
            ));
            if round.round_completed {
                progress.on_round_complete(round.round);
            }
            if verdict == Verdict::EndGame {
                info!("Judge ended the game");
                break BatchOutcome::Completed;
            }
        };

        session.end_game();
        let standings = session.standings();
        info!(
            "Batch game finished ({:?}): {} answers, {} failed turns",
            outcome,
            session.responses().len(),
            failed_turns.len()
        );
        self.logger.log(ConversationEvent::new(
            "game_finished",
            serde_json::json!({
                "outcome": format!("{:?}", outcome),
                "standings": standings
                    .iter()
                    .map(|s| serde_json::json!({"backend": s.backend.as_str(), "points": s.points}))
                    .collect::<Vec<_>>(),
            }),
        ));
        progress.on_game_over(&standings);

        Ok(BatchGameResult {
            topic: input.topic,
            answers: session.responses().to_vec(),
            standings,
            outcome,
            failed_turns,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::answer_backend::GatewayError;
    use crate::use_cases::round_orchestrator::tests::MockBackend;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::Mutex;

    /// Judge that awards the given (0-based) turn indices and skips the rest
    struct ScriptedJudge {
        award_turns: HashSet<usize>,
        seen: Mutex<usize>,
        end_after: Option<usize>,
        fail: bool,
    }

    impl ScriptedJudge {
        fn awarding(turns: &[usize]) -> Self {
            Self {
                award_turns: turns.iter().copied().collect(),
                seen: Mutex::new(0),
                end_after: None,
                fail: false,
            }
        }
    }

    #[async_trait]
    impl JudgePort for ScriptedJudge {
        async fn judge(
            &self,
            _response: &Response,
            _display_name: &str,
        ) -> Result<Verdict, JudgeError> {
            if self.fail {
                return Err(JudgeError::IoError("stdin closed".to_string()));
            }
            let mut seen = self.seen.lock().unwrap();
            let index = *seen;
            *seen += 1;
            if self.end_after == Some(index) {
                return Ok(Verdict::EndGame);
            }
            if self.award_turns.contains(&index) {
                Ok(Verdict::Award)
            } else {
                Ok(Verdict::Skip)
            }
        }
    }

    fn three_backends() -> Vec<BackendId> {
        vec![BackendId::Gemini, BackendId::Claude, BackendId::ChatGpt]
    }

    fn roster() -> BackendRoster {
        BackendRoster::new()
            .with_backend(MockBackend::answering(BackendId::Gemini, "スイカが割れない"))
            .with_backend(MockBackend::answering(BackendId::Claude, "蝉が敬語"))
            .with_backend(MockBackend::answering(BackendId::ChatGpt, "日焼け止めを飲んだ"))
    }

    fn input() -> RunBatchGameInput {
        RunBatchGameInput::new(Topic::new("夏").unwrap(), three_backends()).with_seed(Some(7))
    }

    #[tokio::test]
    async fn test_summer_game_awards_two_answers() {
        let use_case = RunBatchGameUseCase::new(
            roster(),
            Arc::new(ScriptedJudge::awarding(&[1, 6])),
            GameParams::default(),
        );
        let result = use_case.execute(input()).await.unwrap();

        assert_eq!(result.outcome, BatchOutcome::Completed);
        assert_eq!(result.answers.len(), 9);
        for backend in three_backends() {
            let count = result.answers.iter().filter(|r| r.backend == backend).count();
            assert_eq!(count, 3);
        }

        let rounds: Vec<u32> = result.answers.iter().map(|r| r.round).collect();
        assert_eq!(rounds, vec![1, 1, 1, 2, 2, 2, 3, 3, 3]);

        let awarded: Vec<&Response> = result.point_answers().collect();
        assert_eq!(awarded.len(), 2);
        assert_eq!(awarded[0], &result.answers[1]);
        assert_eq!(awarded[1], &result.answers[6]);
        assert_eq!(awarded[0].round, 1);
        assert_eq!(awarded[1].round, 3);

        let total: u32 = result.standings.iter().map(|s| s.points).sum();
        assert_eq!(total, 2);
        assert_eq!(result.standings.len(), 3);
        assert!(result.standings.windows(2).all(|w| w[0].points >= w[1].points));
        assert!(result.failed_turns.is_empty());
    }

    #[tokio::test]
    async fn test_same_seed_same_schedule() {
        let play = || async {
            RunBatchGameUseCase::new(
                roster(),
                Arc::new(ScriptedJudge::awarding(&[])),
                GameParams::default(),
            )
            .execute(input())
            .await
            .unwrap()
        };
        let first = play().await;
        let second = play().await;
        let order = |r: &BatchGameResult| r.answers.iter().map(|a| a.backend).collect::<Vec<_>>();
        assert_eq!(order(&first), order(&second));
    }

    #[tokio::test]
    async fn test_failed_turn_is_dropped() {
        let roster = roster().with_backend(MockBackend::failing(
            BackendId::Claude,
            GatewayError::Http {
                status: 500,
                body: "boom".to_string(),
            },
        ));
        let use_case = RunBatchGameUseCase::new(
            roster,
            Arc::new(ScriptedJudge::awarding(&[])),
            GameParams::default(),
        );
        let result = use_case.execute(input()).await.unwrap();

        assert_eq!(result.outcome, BatchOutcome::Completed);
        assert_eq!(result.failed_turns.len(), 3);
        assert_eq!(result.answers.len(), 6);
        assert!(result.answers.iter().all(|r| r.backend != BackendId::Claude));
    }

    #[tokio::test]
    async fn test_judge_can_end_game() {
        let judge = ScriptedJudge {
            end_after: Some(2),
            ..ScriptedJudge::awarding(&[0])
        };
        let use_case = RunBatchGameUseCase::new(roster(), Arc::new(judge), GameParams::default());
        let result = use_case.execute(input()).await.unwrap();

        assert_eq!(result.outcome, BatchOutcome::Completed);
        assert_eq!(result.answers.len(), 3);
        assert_eq!(result.point_answers().count(), 1);
    }

    #[tokio::test]
    async fn test_judge_failure_aborts_with_results() {
        let judge = ScriptedJudge {
            fail: true,
            ..ScriptedJudge::awarding(&[])
        };
        let use_case = RunBatchGameUseCase::new(roster(), Arc::new(judge), GameParams::default());
        let result = use_case.execute(input()).await.unwrap();

        assert!(result.is_aborted());
        assert_eq!(
            result.outcome,
            BatchOutcome::Aborted(JudgeError::IoError("stdin closed".to_string()))
        );
        assert!(result.answers.is_empty());
        assert_eq!(result.standings.len(), 3);
    }

    #[tokio::test]
    async fn test_cancelled_before_start_is_interrupted() {
        let token = CancellationToken::new();
        token.cancel();
        let use_case = RunBatchGameUseCase::new(
            roster(),
            Arc::new(ScriptedJudge::awarding(&[])),
            GameParams::default(),
        )
        .with_cancellation(token);
        let result = use_case.execute(input()).await.unwrap();

        assert_eq!(result.outcome, BatchOutcome::Interrupted);
        assert!(result.answers.is_empty());
        assert!(result.standings.iter().all(|s| s.points == 0));
    }

    #[tokio::test]
    async fn test_turns_per_backend() {
        let use_case = RunBatchGameUseCase::new(
            roster(),
            Arc::new(ScriptedJudge::awarding(&[])),
            GameParams::default().with_turns_per_backend(1),
        );
        let result = use_case.execute(input()).await.unwrap();
        assert_eq!(result.answers.len(), 3);
        assert!(result.answers.iter().all(|r| r.round == 1));
    }

    #[tokio::test]
    async fn test_no_backends_rejected() {
        let use_case = RunBatchGameUseCase::new(
            roster(),
            Arc::new(ScriptedJudge::awarding(&[])),
            GameParams::default(),
        );
        let input = RunBatchGameInput::new(Topic::new("夏").unwrap(), vec![]);
        let err = use_case.execute(input).await.unwrap_err();
        assert_eq!(err, RunBatchGameError::Domain(DomainError::NoBackends));
    }
}
