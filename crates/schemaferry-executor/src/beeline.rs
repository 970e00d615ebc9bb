//! Beeline executor (`beeline -u <jdbc url> -e <sql>`)

use schemaferry_core::EngineConfig;
use std::path::PathBuf;

use crate::executor::{ExecutionError, StatementExecutor};
use crate::process::EngineProcess;

/// Runs each statement through `beeline` against a HiveServer2 endpoint
#[derive(Debug, Clone)]
pub struct BeelineExecutor {
    process: EngineProcess,
    jdbc_url: String,
    probe: bool,
}

impl BeelineExecutor {
    /// Create an executor for a beeline binary and JDBC URL
    pub fn new(binary: impl Into<PathBuf>, jdbc_url: impl Into<String>) -> Self {
        let jdbc_url = jdbc_url.into();
        Self {
            process: EngineProcess::new(binary)
                .with_leading_args(vec!["-u".to_string(), jdbc_url.clone()]),
            jdbc_url,
            probe: false,
        }
    }

    /// Create an executor from the `[engine]` config section
    pub fn from_config(config: &EngineConfig) -> Self {
        let mut executor = Self::new(config.binary_path(), config.jdbc_url.clone());
        executor.probe = config.probe;

        let mut process = executor
            .process
            .with_hadoop(&config.hadoop_home, &config.path_prefix);
        for (key, value) in &config.env {
            process = process.with_env(key.clone(), value.clone());
        }
        executor.process = process;

        executor
    }

    pub fn jdbc_url(&self) -> &str {
        &self.jdbc_url
    }

    pub fn process(&self) -> &EngineProcess {
        &self.process
    }
}

#[async_trait::async_trait]
impl StatementExecutor for BeelineExecutor {
    fn name(&self) -> &'static str {
        "beeline"
    }

    async fn execute(&self, sql: &str) -> Result<(), ExecutionError> {
        self.process.run(self.name(), sql).await
    }

    async fn test_connection(&self) -> Result<(), ExecutionError> {
        self.process.check_binary().await?;

        if self.probe {
            self.process
                .run(self.name(), "SHOW DATABASES;")
                .await
                .map_err(|e| ExecutionError::Unavailable(format!("{}: {}", self.jdbc_url, e)))?;
        }

        Ok(())
    }
}
