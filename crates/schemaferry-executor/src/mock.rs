//! Mock executor for testing
//!
//! Records statements in memory instead of running them. It's useful for:
//! - Unit testing the ingestion loop
//! - Simulating engine failures on specific statements
//! - Checking statement order without a Hive installation
//!
//! ## Usage
//!
//! ```rust,ignore
//! use schemaferry_executor::{MockExecutor, StatementExecutor};
//!
//! let executor = MockExecutor::new().fail_when_contains("sales.orders");
//! executor.execute("CREATE DATABASE IF NOT EXISTS sales;").await?;
//! assert_eq!(executor.executed().await.len(), 1);
//! ```

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::executor::{ExecutionError, StatementExecutor};

/// In-memory executor that records every statement
///
/// Clones share the same record, so a test can hand one clone to the
/// ingestor and inspect the other.
#[derive(Debug, Clone, Default)]
pub struct MockExecutor {
    /// Statements in execution order, failed ones included
    executed: Arc<Mutex<Vec<String>>>,

    /// Fail the N-th call (1-based)
    fail_on_call: Option<usize>,

    /// Fail any statement containing this text
    fail_pattern: Option<String>,

    /// Simulate an unreachable engine
    fail_connection: bool,
}

impl MockExecutor {
    /// Create a mock that accepts every statement
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the `n`-th call to `execute` (1-based)
    pub fn fail_on_call(mut self, n: usize) -> Self {
        self.fail_on_call = Some(n);
        self
    }

    /// Fail any statement whose text contains `pattern`
    pub fn fail_when_contains(mut self, pattern: impl Into<String>) -> Self {
        self.fail_pattern = Some(pattern.into());
        self
    }

    /// Configure to fail all connection tests
    pub fn with_connection_failure(mut self) -> Self {
        self.fail_connection = true;
        self
    }

    /// Statements seen so far, in order
    pub async fn executed(&self) -> Vec<String> {
        self.executed.lock().await.clone()
    }

    /// Forget recorded statements
    pub async fn clear(&self) {
        self.executed.lock().await.clear();
    }
}

#[async_trait::async_trait]
impl StatementExecutor for MockExecutor {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn execute(&self, sql: &str) -> Result<(), ExecutionError> {
        let call = {
            let mut executed = self.executed.lock().await;
            executed.push(sql.to_string());
            executed.len()
        };

        let fail_call = self.fail_on_call == Some(call);
        let fail_match = self
            .fail_pattern
            .as_deref()
            .is_some_and(|pattern| sql.contains(pattern));

        if fail_call || fail_match {
            Err(ExecutionError::Failed {
                status: "exit status: 1".to_string(),
                sql: sql.to_string(),
            })
        } else {
            Ok(())
        }
    }

    async fn test_connection(&self) -> Result<(), ExecutionError> {
        if self.fail_connection {
            Err(ExecutionError::Unavailable(
                "Simulated connection failure".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}
