//! SchemaFerry ingestion loop
//!
//! Reads schema messages one at a time from a [`MessageSource`], renders
//! them with the DDL synthesizer and applies every statement through a
//! [`schemaferry_executor::StatementExecutor`], strictly in order.
//!
//! ## Features
//!
//! - `kafka` - Kafka consumer source (librdkafka)
//!
//! ## Example
//!
//! ```rust,ignore
//! use schemaferry_ingest::{Ingestor, KafkaSource};
//! use schemaferry_executor::HiveCliExecutor;
//!
//! let source = KafkaSource::connect(&config.kafka)?;
//! let executor = HiveCliExecutor::from_config(&config.engine);
//! let summary = Ingestor::new(source, executor).run().await?;
//! ```

pub mod source;
pub mod kafka;
pub mod dead_letter;
pub mod ingestor;

pub use source::{MessageSource, SourceMessage, MessagePosition, SourceError, MemorySource, FileSource};
pub use kafka::KafkaSource;
pub use dead_letter::{
    DeadLetterSink, DeadLetterRecord, DeadLetterError, JsonlDeadLetterSink, MemoryDeadLetterSink,
};
pub use ingestor::{Ingestor, IngestError, MessageOutcome, RunSummary};
