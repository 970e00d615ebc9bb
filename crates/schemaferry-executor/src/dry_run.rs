//! Executor that only logs statements

use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::info;

use crate::executor::{ExecutionError, StatementExecutor};

/// Logs every statement instead of running it (`--dry-run`)
#[derive(Debug, Default)]
pub struct DryRunExecutor {
    statements: AtomicUsize,
}

impl DryRunExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of statements seen so far
    pub fn statement_count(&self) -> usize {
        self.statements.load(Ordering::Relaxed)
    }
}

#[async_trait::async_trait]
impl StatementExecutor for DryRunExecutor {
    fn name(&self) -> &'static str {
        "dry-run"
    }

    async fn execute(&self, sql: &str) -> Result<(), ExecutionError> {
        self.statements.fetch_add(1, Ordering::Relaxed);
        info!(statement = %sql, "dry run, not executing");
        Ok(())
    }

    async fn test_connection(&self) -> Result<(), ExecutionError> {
        Ok(())
    }
}
