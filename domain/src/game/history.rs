//! Conversation history shared with every backend call

use super::response::Response;
use crate::core::backend::BackendId;
use crate::session::entities::Message;
use serde::{Deserialize, Serialize};

/// A single prior turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Backend that spoke
    pub actor: BackendId,
    pub text: String,
    /// Judge's points, filled in once the verdict is known
    pub points: Option<u32>,
}

impl Turn {
    /// Render the turn the way backends see it in their context
    pub fn render(&self) -> String {
        match self.points {
            Some(points) => format!(
                "[{}の回答] {} (獲得ポイント: {})",
                self.actor, self.text, points
            ),
            None => format!("[{}の回答] {}", self.actor, self.text),
        }
    }
}

/// Ordered, append-only record of prior turns (Entity)
///
/// Grows for the life of a game; only [`ConversationHistory::clear`]
/// (called on a full reset) removes entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationHistory {
    turns: Vec<Turn>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a freshly generated answer
    pub fn push_answer(&mut self, response: &Response) {
        self.turns.push(Turn {
            actor: response.backend,
            text: response.content.clone(),
            points: None,
        });
    }

    /// Attach the judge's points to the most recent turn.
    ///
    /// Returns `false` if there is no turn or it was already scored.
    pub fn record_points(&mut self, points: u32) -> bool {
        match self.turns.last_mut() {
            Some(turn) if turn.points.is_none() => {
                turn.points = Some(points);
                true
            }
            _ => false,
        }
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    /// All turns rendered and joined by newlines
    pub fn render(&self) -> String {
        self.turns
            .iter()
            .map(Turn::render)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Turns as chat messages; every prior answer is an assistant message
    pub fn to_messages(&self) -> Vec<Message> {
        self.turns
            .iter()
            .map(|turn| Message::assistant(turn.render()))
            .collect()
    }
}
