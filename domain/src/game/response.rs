//! Response entity

use crate::core::backend::BackendId;
use serde::{Deserialize, Serialize};

/// One generated answer (Entity)
///
/// Only `points` changes after creation, and only through
/// [`Response::with_points`] when the judge's verdict is recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    /// Round the answer was produced in (1-based)
    pub round: u32,
    /// Backend that produced it
    pub backend: BackendId,
    /// Answer text
    pub content: String,
    /// Points awarded by the judge
    #[serde(default)]
    pub points: u32,
}

impl Response {
    /// Create an unscored response
    pub fn new(round: u32, backend: BackendId, content: impl Into<String>) -> Self {
        Self {
            round,
            backend,
            content: content.into(),
            points: 0,
        }
    }

    /// Return a copy carrying the judge's points
    pub fn with_points(mut self, points: u32) -> Self {
        self.points = points;
        self
    }

    pub fn earned_points(&self) -> bool {
        self.points > 0
    }

    /// Character count of the answer (the budget in the rules is advisory)
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }
}
