//! Answer backend port
//!
//! Defines the single capability every AI vendor must provide: stream an
//! answer to the current topic given the answers so far.

use async_trait::async_trait;
use ogiri_domain::{BackendId, ConversationHistory, Response, StreamEvent, Topic};
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors that can occur while talking to a vendor
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Stream error: {0}")]
    StreamError(String),

    #[error("Backend returned an empty answer")]
    EmptyResponse,

    #[error("Timed out after {0}s")]
    Timeout(u64),

    #[error("Operation cancelled")]
    Cancelled,
}

impl GatewayError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, GatewayError::Cancelled)
    }
}

/// A failed generation attempt, tagged with the backend that failed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Generation failed for {display_name}: {source}")]
pub struct GenerationError {
    pub backend: BackendId,
    pub display_name: String,
    #[source]
    pub source: GatewayError,
}

impl GenerationError {
    pub fn new(backend: BackendId, display_name: impl Into<String>, source: GatewayError) -> Self {
        Self {
            backend,
            display_name: display_name.into(),
            source,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.source.is_cancelled()
    }
}

/// Everything a backend needs to produce one answer
#[derive(Debug, Clone, Copy)]
pub struct AnswerRequest<'a> {
    pub system_prompt: &'a str,
    pub topic: &'a Topic,
    pub history: &'a ConversationHistory,
    /// Round the answer will be recorded in
    pub round: u32,
}

/// Handle for receiving streaming events from a backend.
///
/// Wraps an `mpsc::Receiver<StreamEvent>` and provides convenience methods
/// for consuming the stream.
pub struct StreamHandle {
    pub receiver: mpsc::Receiver<StreamEvent>,
}

impl StreamHandle {
    pub fn new(receiver: mpsc::Receiver<StreamEvent>) -> Self {
        Self { receiver }
    }

    /// Build a handle over a fixed list of events (handy for non-streaming
    /// backends and tests)
    pub fn from_events(events: Vec<StreamEvent>) -> Self {
        let (tx, rx) = mpsc::channel(events.len().max(1));
        for event in events {
            // Capacity covers every event, so this never waits
            let _ = tx.try_send(event);
        }
        Self::new(rx)
    }

    /// Consume the stream, calling `on_partial` with the text accumulated
    /// so far after every chunk, and return the final text.
    pub async fn accumulate(
        mut self,
        on_partial: &mut (dyn for<'s> FnMut(&'s str) + Send),
    ) -> Result<String, GatewayError> {
        let mut full_text = String::new();
        while let Some(event) = self.receiver.recv().await {
            match event {
                StreamEvent::Delta(chunk) => {
                    if chunk.is_empty() {
                        continue;
                    }
                    full_text.push_str(&chunk);
                    on_partial(&full_text);
                }
                StreamEvent::Completed(text) => {
                    if full_text.is_empty() && !text.is_empty() {
                        full_text = text;
                        on_partial(&full_text);
                    }
                    return Ok(full_text);
                }
                StreamEvent::Error(e) => {
                    return Err(GatewayError::StreamError(e));
                }
            }
        }
        // Sender dropped without Completed: the answer was cut off
        Err(GatewayError::StreamError(
            "stream closed before response completed".to_string(),
        ))
    }
}

/// An AI participant
///
/// Implementations live in the infrastructure layer, one per vendor. The
/// orchestrator only ever calls [`AnswerBackend::generate`].
#[async_trait]
pub trait AnswerBackend: Send + Sync {
    /// Which backend this is
    fn id(&self) -> BackendId;

    /// Name shown to the judge
    fn display_name(&self) -> &str;

    /// Start streaming an answer
    async fn open_stream(&self, request: &AnswerRequest<'_>) -> Result<StreamHandle, GatewayError>;

    /// Stream an answer to completion.
    ///
    /// `on_partial` receives the accumulated text (not the delta) zero or
    /// more times. The returned response carries `request.round` and zero
    /// points.
    async fn generate(
        &self,
        request: &AnswerRequest<'_>,
        on_partial: &mut (dyn for<'s> FnMut(&'s str) + Send),
    ) -> Result<Response, GenerationError> {
        let handle = self
            .open_stream(request)
            .await
            .map_err(|e| GenerationError::new(self.id(), self.display_name(), e))?;
        let text = handle
            .accumulate(on_partial)
            .await
            .map_err(|e| GenerationError::new(self.id(), self.display_name(), e))?;
        if text.trim().is_empty() {
            return Err(GenerationError::new(
                self.id(),
                self.display_name(),
                GatewayError::EmptyResponse,
            ));
        }
        Ok(Response::new(request.round, self.id(), text))
    }
}
