//! JSONL file writer for game events.
//!
//! Each [`ConversationEvent`] becomes one JSON line carrying `type`,
//! `timestamp` and a per-process `seq`, appended through a buffered writer.
//! Several games (and several runs) can share one transcript file.

use ogiri_application::{ConversationEvent, ConversationLogger};
use serde_json::Value;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

struct Inner {
    writer: BufWriter<File>,
    seq: u64,
}

/// Transcript logger that appends one JSON object per line.
///
/// Thread-safe via `Mutex`. Flushes after every event and on `Drop`.
pub struct JsonlTranscriptLogger {
    inner: Mutex<Inner>,
    path: PathBuf,
}

impl JsonlTranscriptLogger {
    /// Open (or create) the transcript at `path` for appending.
    ///
    /// Parent directories are created as needed.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            inner: Mutex::new(Inner {
                writer: BufWriter::new(file),
                seq: 0,
            }),
            path: path.to_path_buf(),
        })
    }

    /// Get the path to the transcript file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn record(event: ConversationEvent, seq: u64) -> Value {
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);
        let mut map = match event.payload {
            Value::Object(map) => map,
            other => {
                let mut map = serde_json::Map::new();
                map.insert("data".to_string(), other);
                map
            }
        };
        map.insert("type".to_string(), Value::String(event.event_type.to_string()));
        map.insert("timestamp".to_string(), Value::String(timestamp));
        map.insert("seq".to_string(), Value::from(seq));
        Value::Object(map)
    }
}

impl ConversationLogger for JsonlTranscriptLogger {
    fn log(&self, event: ConversationEvent) {
        let Ok(mut inner) = self.inner.lock() else {
            return;
        };
        inner.seq += 1;
        let record = Self::record(event, inner.seq);
        let Ok(line) = serde_json::to_string(&record) else {
            return;
        };
        if let Err(e) = writeln!(inner.writer, "{}", line).and_then(|_| inner.writer.flush()) {
            warn!("Could not write transcript {}: {}", self.path.display(), e);
        }
    }
}

impl Drop for JsonlTranscriptLogger {
    fn drop(&mut self) {
        if let Ok(mut inner) = self.inner.lock() {
            let _ = inner.writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_lines(path: &Path) -> Vec<Value> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_writes_one_record_per_event() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("game.jsonl");
        let logger = JsonlTranscriptLogger::open(&path).unwrap();

        logger.log(ConversationEvent::new(
            "game_started",
            serde_json::json!({"topic": "夏", "backends": ["gemini", "claude"]}),
        ));
        logger.log(ConversationEvent::new(
            "answer",
            serde_json::json!({"backend": "claude", "round": 1, "content": "蝉が敬語"}),
        ));
        drop(logger);

        let records = read_lines(&path);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["type"], "game_started");
        assert_eq!(records[0]["topic"], "夏");
        assert_eq!(records[0]["seq"], 1);
        assert_eq!(records[1]["type"], "answer");
        assert_eq!(records[1]["content"], "蝉が敬語");
        assert_eq!(records[1]["seq"], 2);
        assert!(records.iter().all(|r| r["timestamp"].is_string()));
    }

    #[test]
    fn test_appends_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.jsonl");
        for _ in 0..2 {
            let logger = JsonlTranscriptLogger::open(&path).unwrap();
            logger.log(ConversationEvent::new("game_finished", serde_json::json!({})));
        }
        assert_eq!(read_lines(&path).len(), 2);
    }

    #[test]
    fn test_non_object_payload_is_wrapped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("game.jsonl");
        let logger = JsonlTranscriptLogger::open(&path).unwrap();
        logger.log(ConversationEvent::new("verdict", serde_json::json!("skip")));
        drop(logger);

        let records = read_lines(&path);
        assert_eq!(records[0]["type"], "verdict");
        assert_eq!(records[0]["data"], "skip");
    }

    #[test]
    fn test_open_fails_on_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(JsonlTranscriptLogger::open(dir.path()).is_err());
    }
}
