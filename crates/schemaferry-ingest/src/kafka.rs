//! Kafka source using librdkafka's `StreamConsumer`
//!
//! Auto-commit is disabled. An offset is committed only after the ingestor
//! has finished with the message, so a crash mid-message leads to
//! redelivery (at-least-once). Redelivered DDL is harmless because every
//! statement is `IF NOT EXISTS`.
//!
//! Built only with the `kafka` feature; without it [`KafkaSource::connect`]
//! returns [`SourceError::Unsupported`].

use schemaferry_core::KafkaConfig;

use crate::source::{MessageSource, SourceError, SourceMessage};

#[cfg(feature = "kafka")]
use crate::source::MessagePosition;

#[cfg(feature = "kafka")]
use rdkafka::{
    consumer::{CommitMode, Consumer, StreamConsumer},
    ClientConfig, Message, Offset, TopicPartitionList,
};

#[cfg(feature = "kafka")]
use tracing::{debug, info};

/// Kafka consumer subscribed to the schema topic
pub struct KafkaSource {
    #[cfg(feature = "kafka")]
    consumer: StreamConsumer,

    topic: String,

    group_id: String,
}

impl KafkaSource {
    /// Create the consumer and subscribe to `config.topic`
    #[cfg(feature = "kafka")]
    pub fn connect(config: &KafkaConfig) -> Result<Self, SourceError> {
        let mut client = ClientConfig::new();
        client
            .set("bootstrap.servers", config.bootstrap_servers())
            .set("group.id", &config.group_id)
            .set("enable.auto.commit", "false")
            .set("auto.offset.reset", "earliest");
        for (key, value) in &config.properties {
            client.set(key, value);
        }

        let consumer: StreamConsumer = client
            .create()
            .map_err(|e| SourceError::Connect(format!("failed to create consumer: {e}")))?;

        consumer
            .subscribe(&[config.topic.as_str()])
            .map_err(|e| SourceError::Connect(format!("failed to subscribe to {}: {e}", config.topic)))?;

        info!(
            brokers = %config.bootstrap_servers(),
            topic = %config.topic,
            group_id = %config.group_id,
            "subscribed to schema topic"
        );

        Ok(Self {
            consumer,
            topic: config.topic.clone(),
            group_id: config.group_id.clone(),
        })
    }

    /// Create source without kafka feature (returns error)
    #[cfg(not(feature = "kafka"))]
    pub fn connect(_config: &KafkaConfig) -> Result<Self, SourceError> {
        Err(SourceError::Unsupported(
            "Kafka support not compiled. Rebuild with: cargo build --features kafka".to_string(),
        ))
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }
}

#[async_trait::async_trait]
impl MessageSource for KafkaSource {
    fn name(&self) -> &'static str {
        "kafka"
    }

    #[cfg(feature = "kafka")]
    async fn next_message(&mut self) -> Result<Option<SourceMessage>, SourceError> {
        let message = self
            .consumer
            .recv()
            .await
            .map_err(|e| SourceError::Read(e.to_string()))?;

        let position = MessagePosition::Kafka {
            topic: message.topic().to_string(),
            partition: message.partition(),
            offset: message.offset(),
        };
        debug!(%position, "received message");

        Ok(Some(SourceMessage {
            payload: message.payload().map(<[u8]>::to_vec).unwrap_or_default(),
            position,
        }))
    }

    #[cfg(not(feature = "kafka"))]
    async fn next_message(&mut self) -> Result<Option<SourceMessage>, SourceError> {
        Err(SourceError::Unsupported("Kafka support not compiled".to_string()))
    }

    #[cfg(feature = "kafka")]
    async fn commit(&mut self, message: &SourceMessage) -> Result<(), SourceError> {
        let MessagePosition::Kafka {
            topic,
            partition,
            offset,
        } = &message.position
        else {
            return Err(SourceError::Commit {
                position: message.position.to_string(),
                message: "not a Kafka message".to_string(),
            });
        };

        let commit_error = |e: rdkafka::error::KafkaError| SourceError::Commit {
            position: message.position.to_string(),
            message: e.to_string(),
        };

        // The committed offset is the next one to read.
        let mut tpl = TopicPartitionList::new();
        tpl.add_partition_offset(topic, *partition, Offset::Offset(offset + 1))
            .map_err(commit_error)?;
        self.consumer
            .commit(&tpl, CommitMode::Sync)
            .map_err(commit_error)?;

        Ok(())
    }

    #[cfg(not(feature = "kafka"))]
    async fn commit(&mut self, _message: &SourceMessage) -> Result<(), SourceError> {
        Err(SourceError::Unsupported("Kafka support not compiled".to_string()))
    }
}
