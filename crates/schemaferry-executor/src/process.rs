//! Child process invocation shared by the Hive clients
//!
//! Environment overrides are applied to the child command only; the
//! parent process environment is never modified.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

use crate::executor::ExecutionError;

/// A command-line engine client: `<binary> [leading args] -e <sql>`
#[derive(Debug, Clone)]
pub struct EngineProcess {
    binary: PathBuf,
    leading_args: Vec<String>,
    env: BTreeMap<String, OsString>,
}

impl EngineProcess {
    /// Create a client with no extra arguments or environment
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            leading_args: Vec::new(),
            env: BTreeMap::new(),
        }
    }

    /// Arguments placed before `-e <sql>`
    pub fn with_leading_args(mut self, args: Vec<String>) -> Self {
        self.leading_args = args;
        self
    }

    /// Set one environment variable for the child
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<OsString>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Set HADOOP_HOME and prepend `path_prefix` to the inherited PATH
    pub fn with_hadoop(self, hadoop_home: &Path, path_prefix: &Path) -> Self {
        let path = prefixed_path(path_prefix, std::env::var_os("PATH"));
        self.with_env("HADOOP_HOME", hadoop_home.as_os_str().to_os_string())
            .with_env("PATH", path)
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Overrides applied on top of the inherited environment
    pub fn env(&self) -> &BTreeMap<String, OsString> {
        &self.env
    }

    /// Full argument list for `sql`
    pub fn args_for(&self, sql: &str) -> Vec<String> {
        let mut args = self.leading_args.clone();
        args.push("-e".to_string());
        args.push(sql.to_string());
        args
    }

    fn command(&self, sql: &str) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.args(self.args_for(sql))
            .envs(&self.env)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            // Dropping the `run` future (Ctrl-C) must not leave the client running.
            .kill_on_drop(true);
        cmd
    }

    /// Run `sql`, streaming the client's output through, and wait for exit
    pub async fn run(&self, engine: &'static str, sql: &str) -> Result<(), ExecutionError> {
        info!(engine, binary = %self.binary.display(), statement = %sql, "executing statement");

        let status = self
            .command(sql)
            .status()
            .await
            .map_err(|e| ExecutionError::Spawn {
                binary: self.binary.clone(),
                message: e.to_string(),
            })?;

        if status.success() {
            debug!(engine, "statement succeeded");
            Ok(())
        } else {
            Err(ExecutionError::Failed {
                status: status.to_string(),
                sql: sql.to_string(),
            })
        }
    }

    /// Fail early if the client binary is missing
    pub async fn check_binary(&self) -> Result<(), ExecutionError> {
        let metadata = tokio::fs::metadata(&self.binary).await.map_err(|e| {
            ExecutionError::Unavailable(format!("{}: {}", self.binary.display(), e))
        })?;

        if !metadata.is_file() {
            return Err(ExecutionError::Unavailable(format!(
                "{} is not a file",
                self.binary.display()
            )));
        }

        Ok(())
    }
}

/// `prefix` followed by every entry of `inherited`
fn prefixed_path(prefix: &Path, inherited: Option<OsString>) -> OsString {
    let mut entries = vec![prefix.to_path_buf()];
    if let Some(inherited) = inherited {
        entries.extend(std::env::split_paths(&inherited));
    }
    // Only fails if the prefix itself contains the separator.
    std::env::join_paths(entries).unwrap_or_else(|_| prefix.as_os_str().to_os_string())
}
