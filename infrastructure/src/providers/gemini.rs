//! Gemini `streamGenerateContent` adapter
//!
//! Gemini is called single-turn: the system instruction carries the rules
//! followed by every previous answer, and the only content is the request.

use super::settings::BackendSettings;
use super::sse::{SseSignal, StreamEnd, open_sse_stream};
use async_trait::async_trait;
use ogiri_application::{AnswerBackend, AnswerRequest, GatewayError, StreamHandle};
use ogiri_domain::{BackendId, PromptTemplate};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

#[derive(Debug, Deserialize)]
struct GenerateChunk {
    #[serde(default)]
    candidates: Vec<Candidate>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

pub struct GeminiBackend {
    client: Client,
    settings: BackendSettings,
}

impl GeminiBackend {
    pub fn new(client: Client, settings: BackendSettings) -> Self {
        Self { client, settings }
    }

    fn request_body(&self, request: &AnswerRequest<'_>) -> Value {
        json!({
            "systemInstruction": {
                "parts": [{
                    "text": PromptTemplate::system_with_history(request.system_prompt, request.history),
                }],
            },
            "contents": [{
                "role": "user",
                "parts": [{ "text": PromptTemplate::answer_prompt(request.topic) }],
            }],
            "generationConfig": {
                "temperature": self.settings.temperature,
                "maxOutputTokens": self.settings.max_tokens,
            },
        })
    }

    /// Map one `alt=sse` event; Gemini has no terminal event, the stream
    /// simply ends
    pub fn parse_event(_event: &str, data: &str) -> SseSignal {
        match serde_json::from_str::<GenerateChunk>(data) {
            Ok(GenerateChunk {
                error: Some(error), ..
            }) => SseSignal::Failed(error.message),
            Ok(chunk) => {
                let text: String = chunk
                    .candidates
                    .into_iter()
                    .next()
                    .and_then(|c| c.content)
                    .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
                    .unwrap_or_default();
                if text.is_empty() {
                    SseSignal::Skip
                } else {
                    SseSignal::Text(text)
                }
            }
            Err(e) => SseSignal::Failed(format!("Unparseable chunk: {}", e)),
        }
    }
}

#[async_trait]
impl AnswerBackend for GeminiBackend {
    fn id(&self) -> BackendId {
        self.settings.backend
    }

    fn display_name(&self) -> &str {
        &self.settings.display_name
    }

    async fn open_stream(&self, request: &AnswerRequest<'_>) -> Result<StreamHandle, GatewayError> {
        let url = format!(
            "{}/v1beta/models/{}:streamGenerateContent",
            self.settings.base_url, self.settings.model_name
        );
        debug!("POST {}", url);
        let builder = self
            .client
            .post(&url)
            .query(&[("alt", "sse")])
            .header("x-goog-api-key", &self.settings.api_key)
            .json(&self.request_body(request));
        open_sse_stream(
            self.settings.backend,
            builder,
            Self::parse_event,
            StreamEnd::Eof,
        )
        .await
    }
}
