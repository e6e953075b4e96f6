//! OpenAI Chat Completions adapter (ChatGPT, and DeepSeek's compatible API)
//!
//! Previous answers are sent as assistant messages between the system
//! prompt and the user's request.

use super::settings::BackendSettings;
use super::sse::{SseSignal, StreamEnd, open_sse_stream};
use async_trait::async_trait;
use ogiri_application::{AnswerBackend, AnswerRequest, GatewayError, StreamHandle};
use ogiri_domain::{BackendId, Message, PromptTemplate};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

#[derive(Debug, Deserialize)]
struct ChatChunk {
    #[serde(default)]
    choices: Vec<Choice>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    delta: ChoiceDelta,
}

#[derive(Debug, Default, Deserialize)]
struct ChoiceDelta {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

pub struct OpenAiBackend {
    client: Client,
    settings: BackendSettings,
}

impl OpenAiBackend {
    pub fn new(client: Client, settings: BackendSettings) -> Self {
        Self { client, settings }
    }

    fn messages(request: &AnswerRequest<'_>) -> Vec<Message> {
        let mut messages = Vec::with_capacity(request.history.len() + 2);
        messages.push(Message::system(request.system_prompt));
        messages.extend(request.history.to_messages());
        messages.push(Message::user(PromptTemplate::answer_prompt(request.topic)));
        messages
    }

    fn request_body(&self, request: &AnswerRequest<'_>) -> Value {
        json!({
            "model": self.settings.model_name,
            "max_tokens": self.settings.max_tokens,
            "temperature": self.settings.temperature,
            "stream": true,
            "messages": Self::messages(request),
        })
    }

    /// Map one Chat Completions SSE event
    pub fn parse_event(_event: &str, data: &str) -> SseSignal {
        let data = data.trim();
        if data == "[DONE]" {
            return SseSignal::Done;
        }
        match serde_json::from_str::<ChatChunk>(data) {
            Ok(ChatChunk {
                error: Some(error), ..
            }) => SseSignal::Failed(error.message),
            Ok(chunk) => chunk
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.delta.content)
                .map(SseSignal::Text)
                .unwrap_or(SseSignal::Skip),
            Err(e) => SseSignal::Failed(format!("Unparseable chunk: {}", e)),
        }
    }
}

#[async_trait]
impl AnswerBackend for OpenAiBackend {
    fn id(&self) -> BackendId {
        self.settings.backend
    }

    fn display_name(&self) -> &str {
        &self.settings.display_name
    }

    async fn open_stream(&self, request: &AnswerRequest<'_>) -> Result<StreamHandle, GatewayError> {
        let url = format!("{}/v1/chat/completions", self.settings.base_url);
        debug!(model = %self.settings.model_name, "POST {}", url);
        let builder = self
            .client
            .post(&url)
            .bearer_auth(&self.settings.api_key)
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::settings::tests::settings_for;
    use ogiri_domain::{ConversationHistory, Response, Topic};
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sse(chunks: &[&str]) -> String {
        chunks.iter().map(|c| format!("data: {}\n\n", c)).collect()
    }

    #[test]
    fn test_parse_content_and_done() {
        assert_eq!(
            OpenAiBackend::parse_event("message", r#"{"choices":[{"delta":{"content":"夏"}}]}"#),
            SseSignal::Text("夏".to_string())
        );
        assert_eq!(
            OpenAiBackend::parse_event("message", r#"{"choices":[{"delta":{"role":"assistant"}}]}"#),
            SseSignal::Skip
        );
        assert_eq!(OpenAiBackend::parse_event("message", "[DONE]"), SseSignal::Done);
    }

    #[test]
    fn test_parse_error_payload() {
        assert_eq!(
            OpenAiBackend::parse_event("message", r#"{"error":{"message":"rate limited"}}"#),
            SseSignal::Failed("rate limited".to_string())
        );
        assert!(matches!(
            OpenAiBackend::parse_event("message", "not json"),
            SseSignal::Failed(_)
        ));
    }

    #[test]
    fn test_messages_put_history_between_system_and_user() {
        let topic = Topic::new("夏").unwrap();
        let mut history = ConversationHistory::new();
        history.push_answer(&Response::new(1, BackendId::Claude, "a"));
        let request = AnswerRequest {
            system_prompt: "rules",
            topic: &topic,
            history: &history,
            round: 1,
        };
        let messages = OpenAiBackend::messages(&request);
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0], Message::system("rules"));
        assert_eq!(messages[1], Message::assistant("[claudeの回答] a"));
        assert_eq!(
            messages[2],
            Message::user("以下のお題で面白い回答を考えてください。\nお題: 夏\n")
        );
    }

    #[tokio::test]
    async fn test_deepseek_streams_through_compatible_api() {
        let server = MockServer::start().await;
        let body = sse(&[
            r#"{"choices":[{"delta":{"role":"assistant"}}]}"#,
            r#"{"choices":[{"delta":{"content":"麦茶が"}}]}"#,
            r#"{"choices":[{"delta":{"content":"麦酒だった"}}]}"#,
            "[DONE]",
        ]);
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(json!({
                "model": "deepseek-chat",
                "stream": true,
            })))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
            .mount(&server)
            .await;

        let backend = OpenAiBackend::new(
            Client::new(),
            settings_for(BackendId::DeepSeek, &server.uri()),
        );
        assert_eq!(backend.id(), BackendId::DeepSeek);
        let topic = Topic::new("夏").unwrap();
        let history = ConversationHistory::new();
        let request = AnswerRequest {
            system_prompt: "rules",
            topic: &topic,
            history: &history,
            round: 3,
        };
        let response = backend.generate(&request, &mut |_: &str| {}).await.unwrap();
        assert_eq!(response.content, "麦茶が麦酒だった");
        assert_eq!(response.round, 3);
    }

    #[tokio::test]
    async fn test_mid_stream_error_fails_generation() {
        let server = MockServer::start().await;
        let body = sse(&[
            r#"{"choices":[{"delta":{"content":"途中"}}]}"#,
            r#"{"error":{"message":"server overloaded"}}"#,
        ]);
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
            .mount(&server)
            .await;

        let backend = OpenAiBackend::new(
            Client::new(),
            settings_for(BackendId::ChatGpt, &server.uri()),
        );
        let topic = Topic::new("夏").unwrap();
        let history = ConversationHistory::new();
        let request = AnswerRequest {
            system_prompt: "rules",
            topic: &topic,
            history: &history,
            round: 1,
        };
        let err = backend
            .generate(&request, &mut |_: &str| {})
            .await
            .unwrap_err();
        assert_eq!(
            err.source,
            GatewayError::StreamError("server overloaded".to_string())
        );
        assert_eq!(err.display_name, "ChatGPT");
    }

    #[tokio::test]
    async fn test_stream_without_done_fails_generation() {
        let server = MockServer::start().await;
        let body = sse(&[r#"{"choices":[{"delta":{"content":"麦茶が"}}]}"#]);
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
            .mount(&server)
            .await;

        let backend = OpenAiBackend::new(
            Client::new(),
            settings_for(BackendId::ChatGpt, &server.uri()),
        );
        let topic = Topic::new("夏").unwrap();
        let history = ConversationHistory::new();
        let request = AnswerRequest {
            system_prompt: "rules",
            topic: &topic,
            history: &history,
            round: 1,
        };
        let err = backend
            .generate(&request, &mut |_: &str| {})
            .await
            .unwrap_err();
        assert_eq!(
            err.source,
            GatewayError::StreamError("stream closed before response completed".to_string())
        );
    }
}
