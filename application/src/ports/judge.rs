//! Judge port for collecting verdicts on answers.
//!
//! # Architecture
//!
//! Following the Ports and Adapters pattern:
//! - **Port**: [`JudgePort`] - defined here in application layer
//! - **Adapter**: `StdinJudge` - implemented in presentation layer
//!
//! The batch game asks the judge once per answer, after the answer has
//! finished streaming. Interactive play does not use this port: its verdicts
//! arrive as separate user actions.

use async_trait::async_trait;
use ogiri_domain::{Response, Verdict};
use thiserror::Error;

/// Failure while asking the judge.
///
/// These errors represent failures of the input channel, not decisions
/// made by the judge.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JudgeError {
    /// The judge cancelled the operation (e.g., via Ctrl+C).
    #[error("Operation cancelled")]
    Cancelled,
    /// Input/output error (e.g., terminal read failure).
    #[error("I/O error: {0}")]
    IoError(String),
}

/// Port for asking the human judge about one answer.
#[async_trait]
pub trait JudgePort: Send + Sync {
    /// Ask for a verdict on a freshly generated answer.
    ///
    /// # Returns
    ///
    /// * `Ok(Verdict::Award)` - Give the answer a point
    /// * `Ok(Verdict::Skip)` - No point (also the answer on end of input)
    /// * `Ok(Verdict::EndGame)` - Stop the game after this answer
    async fn judge(&self, response: &Response, display_name: &str) -> Result<Verdict, JudgeError>;
}

/// Judge that never awards a point.
///
/// Useful for unattended runs where only the transcript matters.
pub struct AutoSkipJudge;

#[async_trait]
impl JudgePort for AutoSkipJudge {
    async fn judge(&self, _response: &Response, _display_name: &str) -> Result<Verdict, JudgeError> {
        Ok(Verdict::Skip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ogiri_domain::BackendId;

    #[tokio::test]
    async fn test_auto_skip_judge() {
        let response = Response::new(1, BackendId::Claude, "x");
        let verdict = AutoSkipJudge.judge(&response, "Claude").await.unwrap();
        assert_eq!(verdict, Verdict::Skip);
    }

    #[test]
    fn test_judge_error_display() {
        assert_eq!(JudgeError::Cancelled.to_string(), "Operation cancelled");
        assert_eq!(
            JudgeError::IoError("broken pipe".to_string()).to_string(),
            "I/O error: broken pipe"
        );
    }
}
