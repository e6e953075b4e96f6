//! Shared SSE plumbing for the vendor adapters
//!
//! Each adapter supplies a pure `(event, data) -> SseSignal` parser; this
//! module sends the request, checks the status, and pumps the parsed
//! events into a [`StreamHandle`] from a background task.
//!
//! The task stops as soon as the handle is dropped, so a timed-out or
//! cancelled call releases its connection.

use eventsource_stream::Eventsource;
use futures::StreamExt;
use ogiri_application::{GatewayError, StreamHandle};
use ogiri_domain::core::string::truncate;
use ogiri_domain::{BackendId, StreamEvent};
use reqwest::RequestBuilder;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, trace};

/// Longest error body kept from a rejected request
const MAX_ERROR_BODY: usize = 512;

/// Buffered events between the HTTP task and the consumer
const CHANNEL_CAPACITY: usize = 64;

/// Longest silence tolerated between two SSE events
const IDLE_TIMEOUT: Duration = Duration::from_secs(90);

/// What one SSE event means for the answer being streamed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseSignal {
    /// A piece of answer text
    Text(String),
    /// The vendor finished the answer
    Done,
    /// The vendor reported an error mid-stream
    Failed(String),
    /// Bookkeeping event with nothing for us (ping, usage, ...)
    Skip,
}

/// Parser from an SSE event name and data payload to a signal
pub type EventParser = fn(&str, &str) -> SseSignal;

/// How a vendor marks the end of an answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEnd {
    /// An explicit event (`message_stop`, `[DONE]`); a body that ends
    /// before it is a cut-off answer
    Terminal,
    /// The body simply ends
    Eof,
}

/// Send `request` and stream the response body through `parse`.
///
/// Connection failures and non-2xx statuses are returned immediately;
/// everything after that arrives as [`StreamEvent`]s.
pub async fn open_sse_stream(
    backend: BackendId,
    request: RequestBuilder,
    parse: EventParser,
    end: StreamEnd,
) -> Result<StreamHandle, GatewayError> {
    open_with_idle_timeout(backend, request, parse, end, IDLE_TIMEOUT).await
}

async fn open_with_idle_timeout(
    backend: BackendId,
    request: RequestBuilder,
    parse: EventParser,
    end: StreamEnd,
    idle_timeout: Duration,
) -> Result<StreamHandle, GatewayError> {
    let response = request
        .send()
        .await
        .map_err(|e| GatewayError::ConnectionError(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        debug!(backend = %backend, status = status.as_u16(), "Vendor rejected request");
        return Err(GatewayError::Http {
            status: status.as_u16(),
            body: truncate(body.trim(), MAX_ERROR_BODY),
        });
    }

    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
    let pump = Pump {
        backend,
        parse,
        end,
        idle_timeout,
    };
    tokio::spawn(pump.run(response, tx));
    Ok(StreamHandle::new(rx))
}

struct Pump {
    backend: BackendId,
    parse: EventParser,
    end: StreamEnd,
    idle_timeout: Duration,
}

impl Pump {
    async fn run(self, response: reqwest::Response, tx: mpsc::Sender<StreamEvent>) {
        let backend = self.backend;
        let mut stream = response.bytes_stream().eventsource();
        let mut text = String::new();

        loop {
            let next = tokio::select! {
                _ = tx.closed() => {
                    debug!(backend = %backend, "Stream consumer went away");
                    return;
                }
                next = tokio::time::timeout(self.idle_timeout, stream.next()) => next,
            };

            let item = match next {
                Ok(Some(item)) => item,
                Ok(None) if self.end == StreamEnd::Terminal => {
                    debug!(backend = %backend, "Stream ended without terminal event");
                    let _ = tx
                        .send(StreamEvent::Error(
                            "stream closed before response completed".to_string(),
                        ))
                        .await;
                    return;
                }
                Ok(None) => break,
                Err(_) => {
                    debug!(backend = %backend, "Stream went idle");
                    let _ = tx
                        .send(StreamEvent::Error(format!(
                            "no data for {:?}",
                            self.idle_timeout
                        )))
                        .await;
                    return;
                }
            };

            let event = match item {
                Ok(event) => event,
                Err(e) => {
                    let _ = tx.send(StreamEvent::Error(format!("SSE error: {}", e))).await;
                    return;
                }
            };
            trace!(backend = %backend, event = %event.event, data = %event.data, "SSE event");

            let out = match (self.parse)(&event.event, &event.data) {
                SseSignal::Text(chunk) if chunk.is_empty() => continue,
                SseSignal::Text(chunk) => {
                    text.push_str(&chunk);
                    StreamEvent::Delta(chunk)
                }
                SseSignal::Done => break,
                SseSignal::Failed(message) => {
                    let _ = tx.send(StreamEvent::Error(message)).await;
                    return;
                }
                SseSignal::Skip => continue,
            };
            if tx.send(out).await.is_err() {
                debug!(backend = %backend, "Stream consumer went away");
                return;
            }
        }

        let _ = tx.send(StreamEvent::Completed(text)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Client;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    const EVENT_STREAM_HEADERS: &[u8] =
        b"HTTP/1.1 200 OK\r\ncontent-type: text/event-stream\r\n\r\n";

    fn text_parser(_event: &str, data: &str) -> SseSignal {
        match data {
            "[END]" => SseSignal::Done,
            _ => SseSignal::Text(data.to_string()),
        }
    }

    /// Server that sends `body` after the headers, then holds the socket open
    /// and reports when the client hangs up
    async fn stalling_server(body: &'static str) -> (String, oneshot::Receiver<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (closed_tx, closed_rx) = oneshot::channel();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            socket.write_all(EVENT_STREAM_HEADERS).await.unwrap();
            socket.write_all(body.as_bytes()).await.unwrap();
            socket.flush().await.unwrap();
            loop {
                match socket.read(&mut buf).await {
                    Ok(0) | Err(_) => break,
                    Ok(_) => {}
                }
            }
            let _ = closed_tx.send(());
        });
        (format!("http://{}/stream", addr), closed_rx)
    }

    #[tokio::test]
    async fn test_dropping_handle_closes_connection() {
        let (url, closed) = stalling_server("data: 途中\n\n").await;
        let handle = open_sse_stream(
            BackendId::Claude,
            Client::new().post(&url),
            text_parser,
            StreamEnd::Terminal,
        )
        .await
        .unwrap();
        drop(handle);

        let hung_up = tokio::time::timeout(Duration::from_secs(3), closed).await;
        assert!(matches!(hung_up, Ok(Ok(()))));
    }

    #[tokio::test]
    async fn test_idle_stream_fails_and_closes_connection() {
        let (url, closed) = stalling_server("data: 途中\n\n").await;
        let handle = open_with_idle_timeout(
            BackendId::Gemini,
            Client::new().post(&url),
            text_parser,
            StreamEnd::Eof,
            Duration::from_millis(200),
        )
        .await
        .unwrap();

        let mut seen = Vec::new();
        let err = handle
            .accumulate(&mut |s: &str| seen.push(s.to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::StreamError(ref m) if m.starts_with("no data for")));
        assert_eq!(seen, vec!["途中"]);

        let hung_up = tokio::time::timeout(Duration::from_secs(3), closed).await;
        assert!(matches!(hung_up, Ok(Ok(()))));
    }
}
