//! Session state: the game's state machine
//!
//! ```text
//! AwaitingTopic ──topic──▶ Generating ──answer──▶ AwaitingVerdict
//!                              ▲                      │
//!                              └──award / skip────────┤
//!                                                     └──end──▶ GameOver
//! ```
//!
//! A round is complete once the number of recorded answers is a multiple
//! of the selected backend count. Completing the last round ends the game.

use super::history::ConversationHistory;
use super::ledger::{ScoreLedger, Standing};
use super::response::Response;
use crate::core::backend::BackendId;
use crate::core::error::DomainError;
use crate::core::topic::Topic;
use serde::{Deserialize, Serialize};

/// Number of rounds in a standard game
pub const MAX_ROUNDS: u32 = 3;

/// Where the game currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    AwaitingTopic,
    Generating,
    AwaitingVerdict,
    GameOver,
}

impl GamePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            GamePhase::AwaitingTopic => "awaiting topic",
            GamePhase::Generating => "generating",
            GamePhase::AwaitingVerdict => "awaiting verdict",
            GamePhase::GameOver => "game over",
        }
    }
}

impl std::fmt::Display for GamePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The judge's three possible actions on a fresh answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Give the answer one point
    Award,
    /// No point, keep playing
    Skip,
    /// Stop the game now
    EndGame,
}

impl Verdict {
    /// Points this verdict gives the answer
    pub fn points(&self) -> u32 {
        match self {
            Verdict::Award => 1,
            Verdict::Skip | Verdict::EndGame => 0,
        }
    }
}

/// What recording an answer did to the round counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundProgress {
    /// Round the answer belongs to
    pub round: u32,
    /// Whether this answer completed its round
    pub round_completed: bool,
    /// Whether the game ended as a result
    pub game_over: bool,
}

/// All state of one game session
///
/// Owned and passed explicitly; independent sessions never share state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    backends: Vec<BackendId>,
    max_rounds: u32,
    topic: Option<Topic>,
    current_round: u32,
    waiting_for_score: bool,
    game_over: bool,
    history: ConversationHistory,
    responses: Vec<Response>,
    ledger: ScoreLedger,
}

impl SessionState {
    /// Create a fresh session for the given backend set (duplicates dropped)
    pub fn new(backends: &[BackendId]) -> Result<Self, DomainError> {
        let backends = dedup(backends);
        if backends.is_empty() {
            return Err(DomainError::NoBackends);
        }
        let ledger = ScoreLedger::new(&backends);
        Ok(Self {
            backends,
            max_rounds: MAX_ROUNDS,
            topic: None,
            current_round: 1,
            waiting_for_score: false,
            game_over: false,
            history: ConversationHistory::new(),
            responses: Vec::new(),
            ledger,
        })
    }

    /// Override the number of rounds (at least one)
    pub fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds.max(1);
        self
    }

    // ==================== Queries ====================

    pub fn phase(&self) -> GamePhase {
        if self.game_over {
            GamePhase::GameOver
        } else if self.topic.is_none() {
            GamePhase::AwaitingTopic
        } else if self.waiting_for_score {
            GamePhase::AwaitingVerdict
        } else {
            GamePhase::Generating
        }
    }

    /// Whether a new answer may be generated right now
    pub fn can_generate(&self) -> bool {
        self.phase() == GamePhase::Generating
    }

    /// Whether anything has happened since the last reset
    pub fn in_progress(&self) -> bool {
        self.topic.is_some() && !self.game_over
    }

    pub fn backends(&self) -> &[BackendId] {
        &self.backends
    }

    pub fn max_rounds(&self) -> u32 {
        self.max_rounds
    }

    pub fn topic(&self) -> Option<&Topic> {
        self.topic.as_ref()
    }

    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    pub fn is_waiting_for_score(&self) -> bool {
        self.waiting_for_score
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub fn responses(&self) -> &[Response] {
        &self.responses
    }

    pub fn ledger(&self) -> &ScoreLedger {
        &self.ledger
    }

    pub fn standings(&self) -> Vec<Standing> {
        self.ledger.standings()
    }

    /// The answer the judge has not ruled on yet
    pub fn pending_response(&self) -> Option<&Response> {
        if self.waiting_for_score {
            self.responses.last()
        } else {
            None
        }
    }

    /// Answers that earned at least one point, in the order given
    pub fn point_answers(&self) -> Vec<&Response> {
        self.responses.iter().filter(|r| r.earned_points()).collect()
    }

    // ==================== Transitions ====================

    /// Set the topic; only allowed once per game
    pub fn submit_topic(&mut self, topic: Topic) -> Result<(), DomainError> {
        self.expect_phase(GamePhase::AwaitingTopic)?;
        self.topic = Some(topic);
        Ok(())
    }

    /// Record a fresh answer and wait for the judge's verdict
    pub fn record_answer(
        &mut self,
        backend: BackendId,
        content: impl Into<String>,
    ) -> Result<RoundProgress, DomainError> {
        self.expect_phase(GamePhase::Generating)?;
        self.expect_member(backend)?;

        let response = Response::new(self.current_round, backend, content);
        self.history.push_answer(&response);
        self.responses.push(response);
        self.waiting_for_score = true;
        Ok(self.advance_round())
    }

    /// Record an answer whose verdict is already known (award or skip)
    pub fn record_judged_answer(
        &mut self,
        backend: BackendId,
        content: impl Into<String>,
        awarded: bool,
    ) -> Result<RoundProgress, DomainError> {
        self.expect_phase(GamePhase::Generating)?;
        self.expect_member(backend)?;

        let points = if awarded {
            self.ledger.award(backend)?;
            1
        } else {
            0
        };
        let response = Response::new(self.current_round, backend, content).with_points(points);
        self.history.push_answer(&response);
        self.history.record_points(points);
        self.responses.push(response);
        Ok(self.advance_round())
    }

    /// Apply the judge's verdict to the pending answer
    pub fn apply_verdict(&mut self, verdict: Verdict) -> Result<Option<Response>, DomainError> {
        self.expect_phase(GamePhase::AwaitingVerdict)?;
        self.waiting_for_score = false;

        match verdict {
            Verdict::Award | Verdict::Skip => {
                let points = verdict.points();
                let Some(backend) = self.responses.last().map(|r| r.backend) else {
                    return Ok(None);
                };
                if points > 0 {
                    self.ledger.award(backend)?;
                }
                let Some(pending) = self.responses.pop() else {
                    return Ok(None);
                };
                let scored = pending.with_points(points);
                self.responses.push(scored.clone());
                self.history.record_points(points);
                Ok(Some(scored))
            }
            Verdict::EndGame => {
                self.game_over = true;
                Ok(None)
            }
        }
    }

    /// Stop the game without a verdict (e.g. an interrupted batch run)
    pub fn end_game(&mut self) {
        self.waiting_for_score = false;
        self.game_over = true;
    }

    /// Return every field to its initial value, keeping the backend set
    pub fn reset(&mut self) {
        self.topic = None;
        self.current_round = 1;
        self.waiting_for_score = false;
        self.game_over = false;
        self.history.clear();
        self.responses.clear();
        self.ledger.reset();
    }

    /// Swap the backend set; rejected while a game is in progress
    pub fn change_backends(&mut self, backends: &[BackendId]) -> Result<(), DomainError> {
        if self.in_progress() {
            return Err(DomainError::GameInProgress("the backend set"));
        }
        let backends = dedup(backends);
        if backends.is_empty() {
            return Err(DomainError::NoBackends);
        }
        self.ledger = ScoreLedger::new(&backends);
        self.backends = backends;
        self.reset();
        Ok(())
    }

    fn expect_phase(&self, expected: GamePhase) -> Result<(), DomainError> {
        match self.phase() {
            p if p == expected => Ok(()),
            GamePhase::GameOver => Err(DomainError::GameOver),
            other => Err(DomainError::InvalidTransition(other.as_str())),
        }
    }

    fn expect_member(&self, backend: BackendId) -> Result<(), DomainError> {
        if self.backends.contains(&backend) {
            Ok(())
        } else {
            Err(DomainError::BackendNotInGame(backend.to_string()))
        }
    }

    fn advance_round(&mut self) -> RoundProgress {
        let round = self.current_round;
        let round_completed = self.responses.len() % self.backends.len() == 0;
        if round_completed {
            self.current_round += 1;
            if self.current_round > self.max_rounds {
                self.game_over = true;
                self.waiting_for_score = false;
            }
        }
        RoundProgress {
            round,
            round_completed,
            game_over: self.game_over,
        }
    }
}

fn dedup(backends: &[BackendId]) -> Vec<BackendId> {
    let mut out = Vec::with_capacity(backends.len());
    for backend in backends {
        if !out.contains(backend) {
            out.push(*backend);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two() -> Vec<BackendId> {
        vec![BackendId::Claude, BackendId::ChatGpt]
    }

    fn started(backends: &[BackendId]) -> SessionState {
        let mut state = SessionState::new(backends).unwrap();
        state.submit_topic(Topic::new("恋愛").unwrap()).unwrap();
        state
    }

    #[test]
    fn test_new_session_initial_values() {
        let state = SessionState::new(&two()).unwrap();
        assert_eq!(state.phase(), GamePhase::AwaitingTopic);
        assert_eq!(state.current_round(), 1);
        assert!(!state.is_waiting_for_score());
        assert!(!state.is_game_over());
        assert!(state.history().is_empty());
        assert_eq!(state.ledger().total_points(), 0);
    }

    #[test]
    fn test_empty_backend_set_rejected() {
        assert_eq!(SessionState::new(&[]), Err(DomainError::NoBackends));
    }

    #[test]
    fn test_topic_moves_to_generating() {
        let state = started(&two());
        assert_eq!(state.phase(), GamePhase::Generating);
        assert!(state.can_generate());
    }

    #[test]
    fn test_topic_is_set_once() {
        let mut state = started(&two());
        let err = state.submit_topic(Topic::new("別").unwrap()).unwrap_err();
        assert_eq!(err, DomainError::InvalidTransition("generating"));
        assert_eq!(state.topic().unwrap().content(), "恋愛");
    }

    #[test]
    fn test_answer_before_topic_rejected() {
        let mut state = SessionState::new(&two()).unwrap();
        assert!(state.record_answer(BackendId::Claude, "x").is_err());
        assert!(state.history().is_empty());
    }

    #[test]
    fn test_answer_waits_for_verdict() {
        let mut state = started(&two());
        state.record_answer(BackendId::Claude, "a").unwrap();
        assert_eq!(state.phase(), GamePhase::AwaitingVerdict);
        assert_eq!(state.pending_response().unwrap().backend, BackendId::Claude);
        // No generation while waiting
        assert_eq!(
            state.record_answer(BackendId::ChatGpt, "b"),
            Err(DomainError::InvalidTransition("awaiting verdict"))
        );
        assert_eq!(state.history().len(), 1);
    }

    #[test]
    fn test_award_adds_point_and_returns_to_generating() {
        let mut state = started(&two());
        state.record_answer(BackendId::Claude, "a").unwrap();
        let scored = state.apply_verdict(Verdict::Award).unwrap().unwrap();
        assert_eq!(scored.points, 1);
        assert_eq!(state.ledger().points(BackendId::Claude), Some(1));
        assert_eq!(state.phase(), GamePhase::Generating);
        assert_eq!(state.point_answers().len(), 1);
    }

    #[test]
    fn test_verdict_replaces_pending_with_scored_copy() {
        let mut state = started(&two());
        state.record_answer(BackendId::ChatGpt, "告白は既読スルー").unwrap();
        let scored = state.apply_verdict(Verdict::Award).unwrap().unwrap();
        assert_eq!(
            scored,
            Response::new(1, BackendId::ChatGpt, "告白は既読スルー").with_points(1)
        );
        assert_eq!(state.responses(), std::slice::from_ref(&scored));

        state.record_answer(BackendId::Claude, "b").unwrap();
        let skipped = state.apply_verdict(Verdict::Skip).unwrap().unwrap();
        assert_eq!(skipped.points, 0);
        assert_eq!(state.responses().len(), 2);
        assert_eq!(state.responses()[1], skipped);
    }

    #[test]
    fn test_skip_adds_nothing() {
        let mut state = started(&two());
        state.record_answer(BackendId::Claude, "a").unwrap();
        state.apply_verdict(Verdict::Skip).unwrap();
        assert_eq!(state.ledger().total_points(), 0);
        assert_eq!(state.phase(), GamePhase::Generating);
        assert_eq!(state.history().turns()[0].points, Some(0));
    }

    #[test]
    fn test_verdict_applies_once() {
        let mut state = started(&two());
        state.record_answer(BackendId::Claude, "a").unwrap();
        state.apply_verdict(Verdict::Award).unwrap();
        assert!(state.apply_verdict(Verdict::Award).is_err());
        assert_eq!(state.ledger().points(BackendId::Claude), Some(1));
    }

    #[test]
    fn test_end_game_is_terminal() {
        let mut state = started(&two());
        state.record_answer(BackendId::Claude, "a").unwrap();
        state.apply_verdict(Verdict::EndGame).unwrap();
        assert_eq!(state.phase(), GamePhase::GameOver);
        assert_eq!(
            state.record_answer(BackendId::Claude, "b"),
            Err(DomainError::GameOver)
        );
        assert_eq!(state.apply_verdict(Verdict::Award), Err(DomainError::GameOver));
    }

    #[test]
    fn test_round_formula_holds_for_every_answer_count() {
        for n in 1..=4usize {
            let backends: Vec<_> = BackendId::ALL[..n].to_vec();
            let mut state = started(&backends);
            let mut k = 0usize;
            while !state.is_game_over() {
                let backend = backends[k % n];
                state.record_judged_answer(backend, "x", false).unwrap();
                k += 1;
                let expected = 1 + (k / n) as u32;
                assert_eq!(state.current_round(), expected);
                assert_eq!(state.is_game_over(), expected > MAX_ROUNDS);
                assert!(state.current_round() <= MAX_ROUNDS + 1);
            }
            assert_eq!(k, n * MAX_ROUNDS as usize);
        }
    }

    #[test]
    fn test_round_advances_after_n_answers() {
        let mut state = started(&two());
        let progress = state.record_answer(BackendId::Claude, "a").unwrap();
        assert!(!progress.round_completed);
        state.apply_verdict(Verdict::Award).unwrap();
        let progress = state.record_answer(BackendId::Claude, "b").unwrap();
        assert!(progress.round_completed);
        assert_eq!(progress.round, 1);
        assert_eq!(state.current_round(), 2);
    }

    #[test]
    fn test_last_round_ends_game() {
        let mut state = started(&[BackendId::Gemini]).with_max_rounds(2);
        state.record_answer(BackendId::Gemini, "a").unwrap();
        state.apply_verdict(Verdict::Skip).unwrap();
        let progress = state.record_answer(BackendId::Gemini, "b").unwrap();
        assert!(progress.game_over);
        assert_eq!(state.phase(), GamePhase::GameOver);
        assert!(state.pending_response().is_none());
    }

    #[test]
    fn test_judged_answer_awards_and_scores_history() {
        let mut state = started(&two());
        state.record_judged_answer(BackendId::ChatGpt, "a", true).unwrap();
        assert_eq!(state.ledger().points(BackendId::ChatGpt), Some(1));
        assert_eq!(state.responses()[0].points, 1);
        assert_eq!(state.history().turns()[0].points, Some(1));
        assert_eq!(state.phase(), GamePhase::Generating);
    }

    #[test]
    fn test_unknown_backend_rejected_without_side_effects() {
        let mut state = started(&two());
        let err = state.record_answer(BackendId::Gemini, "a").unwrap_err();
        assert_eq!(err, DomainError::BackendNotInGame("gemini".to_string()));
        assert!(state.responses().is_empty());
        assert!(state.history().is_empty());
    }

    #[test]
    fn test_reset_restores_initial_values() {
        let mut state = started(&two());
        state.record_answer(BackendId::Claude, "a").unwrap();
        state.apply_verdict(Verdict::Award).unwrap();
        state.record_answer(BackendId::ChatGpt, "b").unwrap();
        state.reset();
        assert_eq!(state, SessionState::new(&two()).unwrap());
    }

    #[test]
    fn test_change_backends_rejected_mid_game() {
        let mut state = started(&two());
        assert_eq!(
            state.change_backends(&[BackendId::Gemini]),
            Err(DomainError::GameInProgress("the backend set"))
        );
        state.reset();
        state.change_backends(&[BackendId::Gemini]).unwrap();
        assert_eq!(state.backends(), &[BackendId::Gemini]);
        assert_eq!(state.ledger().points(BackendId::Gemini), Some(0));
        assert_eq!(state.ledger().points(BackendId::Claude), None);
    }

    #[test]
    fn test_change_backends_allowed_after_game_over() {
        let mut state = started(&two());
        state.end_game();
        state.change_backends(&[BackendId::DeepSeek]).unwrap();
        assert_eq!(state.phase(), GamePhase::AwaitingTopic);
    }
}
