//! The ingestion loop
//!
//! ```text
//! Reading ──next_message──▶ Processing ──commit──▶ Reading
//!                             │
//!                             ├─ decode payload into Schema
//!                             ├─ plan: database DDL, then table DDL in order
//!                             └─ execute each statement, stop at first failure
//! ```
//!
//! A message is committed only after every statement succeeded, or after
//! the error policy decided to skip or dead-letter it. Under
//! [`ErrorPolicy::FailFast`] the failing message is left uncommitted and
//! `run` returns the error.

use schemaferry_core::{is_known_type, ErrorPolicy, Schema};
use schemaferry_ddl::{DdlError, DdlSynthesizer, StatementTarget};
use schemaferry_executor::{ExecutionError, StatementExecutor};
use tracing::{debug, error, info, warn};

use crate::dead_letter::{DeadLetterError, DeadLetterRecord, DeadLetterSink};
use crate::source::{MessageSource, SourceError, SourceMessage};

/// Errors raised by the ingestion loop
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("Error decoding schema message: {0}")]
    Decode(#[from] schemaferry_core::DecodeError),

    #[error("Error rendering DDL: {0}")]
    Ddl(#[from] DdlError),

    #[error("Error creating {target} in Hive: {source}")]
    Execution {
        target: StatementTarget,
        source: ExecutionError,
    },

    #[error(transparent)]
    DeadLetter(#[from] DeadLetterError),

    #[error("Invalid pipeline configuration: {0}")]
    Config(String),
}

impl IngestError {
    /// Errors about a single message, which the error policy may skip
    ///
    /// Source and dead-letter failures are never skippable.
    pub fn is_message_error(&self) -> bool {
        matches!(
            self,
            Self::Decode(_) | Self::Ddl(_) | Self::Execution { .. }
        )
    }
}

/// What happened to one message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageOutcome {
    /// Every statement ran
    Applied { statements: usize },

    /// Dropped after logging (skip policy)
    Skipped { error: String },

    /// Written to the dead-letter sink
    DeadLettered { error: String },
}

/// Counters for a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Messages fully applied
    pub applied: usize,

    /// Messages dropped by the skip policy
    pub skipped: usize,

    /// Messages sent to the dead-letter sink
    pub dead_lettered: usize,

    /// Statements executed successfully
    pub statements: usize,
}

/// Drives messages from a source through the synthesizer and executor
pub struct Ingestor<S, E> {
    source: S,
    executor: E,
    synthesizer: DdlSynthesizer,
    policy: ErrorPolicy,
    dead_letters: Option<Box<dyn DeadLetterSink>>,
    summary: RunSummary,
}

impl<S, E> Ingestor<S, E>
where
    S: MessageSource,
    E: StatementExecutor,
{
    /// Create a fail-fast ingestor with identifier validation
    pub fn new(source: S, executor: E) -> Self {
        Self {
            source,
            executor,
            synthesizer: DdlSynthesizer::default(),
            policy: ErrorPolicy::FailFast,
            dead_letters: None,
            summary: RunSummary::default(),
        }
    }

    pub fn with_synthesizer(mut self, synthesizer: DdlSynthesizer) -> Self {
        self.synthesizer = synthesizer;
        self
    }

    pub fn with_policy(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_dead_letter_sink(mut self, sink: impl DeadLetterSink + 'static) -> Self {
        self.dead_letters = Some(Box::new(sink));
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn summary(&self) -> RunSummary {
        self.summary
    }

    /// Execute every statement for `schema`, database first
    ///
    /// Stops at the first failing statement; later tables are not attempted
    /// and earlier ones are left as the engine created them.
    pub async fn apply_schema(&self, schema: &Schema) -> Result<usize, IngestError> {
        let plan = self.synthesizer.plan(schema)?;

        info!(
            database = %schema.database_name,
            tables = schema.tables.len(),
            "applying schema"
        );

        for table in &schema.tables {
            for column in table.columns.iter().filter(|c| !is_known_type(&c.data_type)) {
                debug!(
                    database = %schema.database_name,
                    table = %table.name,
                    column = %column.name,
                    data_type = %column.data_type,
                    "unrecognized source type, mapping to STRING"
                );
            }
        }

        for statement in &plan {
            self.executor
                .execute(&statement.sql)
                .await
                .map_err(|source| IngestError::Execution {
                    target: statement.target.clone(),
                    source,
                })?;
        }

        Ok(plan.len())
    }

    /// Decode and apply one raw payload
    pub async fn process_payload(&self, payload: &[u8]) -> Result<usize, IngestError> {
        let schema = Schema::from_slice(payload)?;
        self.apply_schema(&schema).await
    }

    /// Process one message under the error policy, then commit it
    pub async fn handle_message(
        &mut self,
        message: &SourceMessage,
    ) -> Result<MessageOutcome, IngestError> {
        let outcome = match self.process_payload(&message.payload).await {
            Ok(statements) => {
                self.summary.applied += 1;
                self.summary.statements += statements;
                MessageOutcome::Applied { statements }
            }
            Err(err) if err.is_message_error() => match self.policy {
                ErrorPolicy::FailFast => {
                    error!(position = %message.position, error = %err, "message failed");
                    return Err(err);
                }
                ErrorPolicy::SkipMessage => {
                    warn!(position = %message.position, error = %err, "skipping message");
                    self.summary.skipped += 1;
                    MessageOutcome::Skipped {
                        error: err.to_string(),
                    }
                }
                ErrorPolicy::DeadLetter => {
                    let sink = self.dead_letters.as_ref().ok_or_else(|| {
                        IngestError::Config("dead-letter policy without a sink".to_string())
                    })?;
                    sink.write(&DeadLetterRecord::new(message, &err)).await?;
                    warn!(position = %message.position, error = %err, "message dead-lettered");
                    self.summary.dead_lettered += 1;
                    MessageOutcome::DeadLettered {
                        error: err.to_string(),
                    }
                }
            },
            Err(err) => return Err(err),
        };

        self.source.commit(message).await?;
        Ok(outcome)
    }

    /// Consume until the source is exhausted or an error is fatal
    pub async fn run(&mut self) -> Result<RunSummary, IngestError> {
        if self.policy == ErrorPolicy::DeadLetter && self.dead_letters.is_none() {
            return Err(IngestError::Config(
                "dead-letter policy without a sink".to_string(),
            ));
        }

        info!(source = self.source.name(), executor = self.executor.name(), policy = ?self.policy, "starting ingestion");

        while let Some(message) = self.source.next_message().await? {
            self.handle_message(&message).await?;
        }

        info!(
            applied = self.summary.applied,
            skipped = self.summary.skipped,
            dead_lettered = self.summary.dead_lettered,
            "source exhausted"
        );
        Ok(self.summary)
    }
}
