//! Anthropic Messages API adapter (Claude)
//!
//! The Messages API requires the first message to come from the user, so
//! previous answers are inlined into the single user message.

use super::settings::BackendSettings;
use super::sse::{SseSignal, StreamEnd, open_sse_stream};
use async_trait::async_trait;
use ogiri_application::{AnswerBackend, AnswerRequest, GatewayError, StreamHandle};
use ogiri_domain::{BackendId, PromptTemplate};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

const API_VERSION: &str = "2023-06-01";

#[derive(Debug, Deserialize)]
struct ContentBlockDelta {
    delta: Delta,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Delta {
    TextDelta {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct ErrorEvent {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(rename = "type", default)]
    kind: String,
    message: String,
}

pub struct AnthropicBackend {
    client: Client,
    settings: BackendSettings,
}

impl AnthropicBackend {
    pub fn new(client: Client, settings: BackendSettings) -> Self {
        Self { client, settings }
    }

    fn request_body(&self, request: &AnswerRequest<'_>) -> Value {
        json!({
            "model": self.settings.model_name,
            "max_tokens": self.settings.max_tokens,
            "temperature": self.settings.temperature,
            "system": request.system_prompt,
            "stream": true,
            "messages": [{
                "role": "user",
                "content": PromptTemplate::answer_prompt_with_history(request.topic, request.history),
            }],
        })
    }

    /// Map one Messages API SSE event
    pub fn parse_event(event: &str, data: &str) -> SseSignal {
        match event {
            "content_block_delta" => match serde_json::from_str::<ContentBlockDelta>(data) {
                Ok(ContentBlockDelta {
                    delta: Delta::TextDelta { text },
                }) => SseSignal::Text(text),
                Ok(_) => SseSignal::Skip,
                Err(e) => SseSignal::Failed(format!("Unparseable content_block_delta: {}", e)),
            },
            "message_stop" => SseSignal::Done,
            "error" => match serde_json::from_str::<ErrorEvent>(data) {
                Ok(ErrorEvent { error }) => {
                    SseSignal::Failed(format!("{}: {}", error.kind, error.message))
                }
                Err(_) => SseSignal::Failed(data.to_string()),
            },
            _ => SseSignal::Skip,
        }
    }
}

#[async_trait]
impl AnswerBackend for AnthropicBackend {
    fn id(&self) -> BackendId {
        self.settings.backend
    }

    fn display_name(&self) -> &str {
        &self.settings.display_name
    }

    async fn open_stream(&self, request: &AnswerRequest<'_>) -> Result<StreamHandle, GatewayError> {
        let url = format!("{}/v1/messages", self.settings.base_url);
        debug!(model = %self.settings.model_name, "POST {}", url);
        let builder = self
            .client
            .post(&url)
            .header("x-api-key", &self.settings.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&self.request_body(request));
        open_sse_stream(
            self.settings.backend,
            builder,
            Self::parse_event,
            StreamEnd::Terminal,
        )
        .await
    }
}
