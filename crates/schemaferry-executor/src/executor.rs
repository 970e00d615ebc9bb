//! Executor trait for applying DDL to the warehouse

use schemaferry_core::{EngineConfig, EngineKind};
use std::path::PathBuf;

use crate::beeline::BeelineExecutor;
use crate::hive::HiveCliExecutor;

/// Errors that can occur when running a statement
#[derive(Debug, Clone, thiserror::Error)]
pub enum ExecutionError {
    #[error("Failed to start {}: {message}", .binary.display())]
    Spawn { binary: PathBuf, message: String },

    #[error("Engine exited with {status} while running: {sql}")]
    Failed { status: String, sql: String },

    #[error("Engine unavailable: {0}")]
    Unavailable(String),
}

/// Something that can apply a single DDL statement
#[async_trait::async_trait]
pub trait StatementExecutor: Send + Sync {
    /// Get the executor name (e.g., "hive-cli", "beeline")
    fn name(&self) -> &'static str;

    /// Run one statement and wait for it to finish
    async fn execute(&self, sql: &str) -> Result<(), ExecutionError>;

    /// Check the engine can be reached before consuming messages
    async fn test_connection(&self) -> Result<(), ExecutionError>;
}

#[async_trait::async_trait]
impl<T: StatementExecutor + ?Sized> StatementExecutor for Box<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn execute(&self, sql: &str) -> Result<(), ExecutionError> {
        (**self).execute(sql).await
    }

    async fn test_connection(&self) -> Result<(), ExecutionError> {
        (**self).test_connection().await
    }
}

/// Build the executor described by the `[engine]` config section
pub fn from_config(config: &EngineConfig) -> Box<dyn StatementExecutor> {
    match config.kind {
        EngineKind::HiveCli => Box::new(HiveCliExecutor::from_config(config)),
        EngineKind::Beeline => Box::new(BeelineExecutor::from_config(config)),
    }
}
