//! Dead-letter sinks for messages that could not be applied

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::source::SourceMessage;

/// A failed message as written to the dead-letter file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadLetterRecord {
    /// Source position (`topic[partition]@offset`, file path, ...)
    pub position: String,

    /// Error that caused the message to be dropped
    pub error: String,

    /// Payload as text; invalid UTF-8 is replaced
    pub payload: String,

    /// Milliseconds since the Unix epoch
    pub failed_at_ms: u64,
}

impl DeadLetterRecord {
    pub fn new(message: &SourceMessage, error: impl ToString) -> Self {
        let failed_at_ms = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();

        Self {
            position: message.position.to_string(),
            error: error.to_string(),
            payload: String::from_utf8_lossy(&message.payload).into_owned(),
            failed_at_ms,
        }
    }
}

/// Errors writing dead letters
#[derive(Debug, thiserror::Error)]
pub enum DeadLetterError {
    #[error("Failed to write dead letter to {}: {message}", .path.display())]
    Io { path: PathBuf, message: String },

    #[error("Failed to encode dead letter: {0}")]
    Encode(String),
}

/// Destination for messages the ingestor gives up on
#[async_trait::async_trait]
pub trait DeadLetterSink: Send + Sync {
    async fn write(&self, record: &DeadLetterRecord) -> Result<(), DeadLetterError>;
}

/// Appends one JSON object per line to a file
#[derive(Debug, Clone)]
pub struct JsonlDeadLetterSink {
    path: PathBuf,
}

impl JsonlDeadLetterSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, e: std::io::Error) -> DeadLetterError {
        DeadLetterError::Io {
            path: self.path.clone(),
            message: e.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl DeadLetterSink for JsonlDeadLetterSink {
    async fn write(&self, record: &DeadLetterRecord) -> Result<(), DeadLetterError> {
        let mut line =
            serde_json::to_string(record).map_err(|e| DeadLetterError::Encode(e.to_string()))?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| self.io_error(e))?;

        file.write_all(line.as_bytes())
            .await
            .map_err(|e| self.io_error(e))?;
        file.sync_data().await.map_err(|e| self.io_error(e))?;

        Ok(())
    }
}

/// Keeps dead letters in memory; clones share the same list
#[derive(Debug, Clone, Default)]
pub struct MemoryDeadLetterSink {
    records: Arc<Mutex<Vec<DeadLetterRecord>>>,
}

impl MemoryDeadLetterSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn records(&self) -> Vec<DeadLetterRecord> {
        self.records.lock().await.clone()
    }
}

#[async_trait::async_trait]
impl DeadLetterSink for MemoryDeadLetterSink {
    async fn write(&self, record: &DeadLetterRecord) -> Result<(), DeadLetterError> {
        self.records.lock().await.push(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MessagePosition;

    fn message(payload: &[u8]) -> SourceMessage {
        SourceMessage {
            payload: payload.to_vec(),
            position: MessagePosition::Memory(7),
        }
    }

    #[test]
    fn record_captures_message() {
        let record = DeadLetterRecord::new(&message(b"{bad"), "Invalid schema JSON");

        assert_eq!(record.position, "memory#7");
        assert_eq!(record.error, "Invalid schema JSON");
        assert_eq!(record.payload, "{bad");
        assert!(record.failed_at_ms > 0);
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let record = DeadLetterRecord::new(&message(&[0xff, b'a']), "x");
        assert_eq!(record.payload, "\u{fffd}a");
    }

    #[tokio::test]
    async fn jsonl_sink_appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonlDeadLetterSink::new(dir.path().join("dlq.jsonl"));

        sink.write(&DeadLetterRecord::new(&message(b"one"), "e1")).await.unwrap();
        sink.write(&DeadLetterRecord::new(&message(b"two"), "e2")).await.unwrap();

        let contents = std::fs::read_to_string(sink.path()).unwrap();
        let records: Vec<DeadLetterRecord> = contents
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].payload, "one");
        assert_eq!(records[1].error, "e2");
    }

    #[tokio::test]
    async fn jsonl_sink_reports_unwritable_path() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonlDeadLetterSink::new(dir.path().join("no/such/dir/dlq.jsonl"));

        let err = sink
            .write(&DeadLetterRecord::new(&message(b"x"), "e"))
            .await
            .unwrap_err();
        assert!(matches!(err, DeadLetterError::Io { .. }));
    }
}
