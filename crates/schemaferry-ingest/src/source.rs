//! Message sources
//!
//! A source hands out one raw message at a time and is told when that
//! message has been fully handled. Sources that never end (Kafka) only
//! return `Ok(None)` when closed; finite sources return it once drained.

use std::collections::VecDeque;
use std::fmt;
use std::path::PathBuf;

/// Where a message came from, for logs and dead letters
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessagePosition {
    Kafka {
        topic: String,
        partition: i32,
        offset: i64,
    },
    File(PathBuf),
    Memory(usize),
}

impl fmt::Display for MessagePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Kafka {
                topic,
                partition,
                offset,
            } => write!(f, "{}[{}]@{}", topic, partition, offset),
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Memory(index) => write!(f, "memory#{}", index),
        }
    }
}

/// One raw message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceMessage {
    pub payload: Vec<u8>,
    pub position: MessagePosition,
}

/// Errors reading from or committing to a source
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Failed to connect: {0}")]
    Connect(String),

    #[error("Failed to read message: {0}")]
    Read(String),

    #[error("Failed to commit {position}: {message}")]
    Commit { position: String, message: String },

    #[error("Failed to read {}: {message}", .path.display())]
    Io { path: PathBuf, message: String },

    #[error("Unsupported source: {0}")]
    Unsupported(String),
}

/// Trait for anything that yields schema messages
#[async_trait::async_trait]
pub trait MessageSource: Send {
    /// Get the source name (e.g., "kafka", "file")
    fn name(&self) -> &'static str;

    /// Wait for the next message. `Ok(None)` means the source is exhausted.
    async fn next_message(&mut self) -> Result<Option<SourceMessage>, SourceError>;

    /// Mark `message` as handled so it is not delivered again
    async fn commit(&mut self, message: &SourceMessage) -> Result<(), SourceError>;
}

#[async_trait::async_trait]
impl<T: MessageSource + ?Sized> MessageSource for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn next_message(&mut self) -> Result<Option<SourceMessage>, SourceError> {
        (**self).next_message().await
    }

    async fn commit(&mut self, message: &SourceMessage) -> Result<(), SourceError> {
        (**self).commit(message).await
    }
}

/// In-memory source for tests and embedding
///
/// Entries are either payloads or injected read failures.
#[derive(Debug, Default)]
pub struct MemorySource {
    pending: VecDeque<Result<Vec<u8>, String>>,
    delivered: usize,
    committed: Vec<MessagePosition>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a source from payloads, delivered in order
    pub fn from_payloads<I, P>(payloads: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Vec<u8>>,
    {
        let mut source = Self::new();
        for payload in payloads {
            source.push(payload);
        }
        source
    }

    /// Queue a payload
    pub fn push(&mut self, payload: impl Into<Vec<u8>>) {
        self.pending.push_back(Ok(payload.into()));
    }

    /// Queue a read failure
    pub fn push_error(&mut self, message: impl Into<String>) {
        self.pending.push_back(Err(message.into()));
    }

    /// Positions committed so far, in order
    pub fn committed(&self) -> &[MessagePosition] {
        &self.committed
    }

    /// Entries not yet delivered
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

#[async_trait::async_trait]
impl MessageSource for MemorySource {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn next_message(&mut self) -> Result<Option<SourceMessage>, SourceError> {
        match self.pending.pop_front() {
            None => Ok(None),
            Some(Err(message)) => Err(SourceError::Read(message)),
            Some(Ok(payload)) => {
                let position = MessagePosition::Memory(self.delivered);
                self.delivered += 1;
                Ok(Some(SourceMessage { payload, position }))
            }
        }
    }

    async fn commit(&mut self, message: &SourceMessage) -> Result<(), SourceError> {
        self.committed.push(message.position.clone());
        Ok(())
    }
}

/// Reads one schema message per file
#[derive(Debug)]
pub struct FileSource {
    paths: VecDeque<PathBuf>,
}

impl FileSource {
    pub fn new(paths: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            paths: paths.into_iter().collect(),
        }
    }
}

#[async_trait::async_trait]
impl MessageSource for FileSource {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn next_message(&mut self) -> Result<Option<SourceMessage>, SourceError> {
        let Some(path) = self.paths.pop_front() else {
            return Ok(None);
        };

        let payload = tokio::fs::read(&path).await.map_err(|e| SourceError::Io {
            path: path.clone(),
            message: e.to_string(),
        })?;

        Ok(Some(SourceMessage {
            payload,
            position: MessagePosition::File(path),
        }))
    }

    async fn commit(&mut self, _message: &SourceMessage) -> Result<(), SourceError> {
        Ok(())
    }
}
