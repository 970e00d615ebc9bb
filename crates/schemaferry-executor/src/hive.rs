//! Hive CLI executor (`hive -e <sql>`)

use schemaferry_core::EngineConfig;
use std::path::{Path, PathBuf};

use crate::executor::{ExecutionError, StatementExecutor};
use crate::process::EngineProcess;

/// Runs each statement through the local `hive` command-line client
///
/// The client is started once per statement with HADOOP_HOME set and the
/// Hadoop bin directory prepended to PATH. Its output goes straight to
/// this process's stdout/stderr.
#[derive(Debug, Clone)]
pub struct HiveCliExecutor {
    process: EngineProcess,
    probe: bool,
}

impl HiveCliExecutor {
    /// Create an executor for the given `hive` binary with no environment overrides
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            process: EngineProcess::new(binary),
            probe: false,
        }
    }

    /// Create an executor from the `[engine]` config section
    pub fn from_config(config: &EngineConfig) -> Self {
        let mut process = EngineProcess::new(config.binary_path())
            .with_hadoop(&config.hadoop_home, &config.path_prefix);
        for (key, value) in &config.env {
            process = process.with_env(key.clone(), value.clone());
        }

        Self {
            process,
            probe: config.probe,
        }
    }

    /// Also run `SHOW DATABASES;` in `test_connection`
    pub fn with_probe(mut self, probe: bool) -> Self {
        self.probe = probe;
        self
    }

    /// Set HADOOP_HOME and the PATH prefix for the child process
    pub fn with_hadoop(mut self, hadoop_home: &Path, path_prefix: &Path) -> Self {
        self.process = self.process.with_hadoop(hadoop_home, path_prefix);
        self
    }

    pub fn process(&self) -> &EngineProcess {
        &self.process
    }
}

#[async_trait::async_trait]
impl StatementExecutor for HiveCliExecutor {
    fn name(&self) -> &'static str {
        "hive-cli"
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
                .map_err(|e| ExecutionError::Unavailable(e.to_string()))?;
        }

        Ok(())
    }
}
