//! Configuration schema (schemaferry.toml)
//!
//! Every field has a default matching the stock single-node setup
//! (Kafka on `localhost:9092`, Hive under `/usr/local/hive`), so an empty
//! file is a valid configuration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Environment variables that override the `[kafka]` section
pub const ENV_BROKERS: &str = "SCHEMAFERRY_BROKERS";
pub const ENV_TOPIC: &str = "SCHEMAFERRY_TOPIC";
pub const ENV_GROUP_ID: &str = "SCHEMAFERRY_GROUP_ID";

/// Kafka consumer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KafkaConfig {
    /// Bootstrap brokers
    pub brokers: Vec<String>,

    /// Topic carrying schema messages
    pub topic: String,

    /// Consumer group id
    pub group_id: String,

    /// Extra librdkafka properties passed through verbatim
    pub properties: BTreeMap<String, String>,
}

impl Default for KafkaConfig {
    fn default() -> Self {
        Self {
            brokers: vec!["localhost:9092".to_string()],
            topic: "variant".to_string(),
            group_id: "0".to_string(),
            properties: BTreeMap::new(),
        }
    }
}

impl KafkaConfig {
    /// Comma-separated broker list as librdkafka expects it
    pub fn bootstrap_servers(&self) -> String {
        self.brokers.join(",")
    }
}

/// Which Hive client is used to run statements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EngineKind {
    /// `hive -e <sql>`
    HiveCli,

    /// `beeline -u <jdbc url> -e <sql>`
    Beeline,
}

impl Default for EngineKind {
    fn default() -> Self {
        Self::HiveCli
    }
}

/// Execution engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Client flavour
    pub kind: EngineKind,

    /// Client executable. Defaults depend on `kind`.
    pub binary: Option<PathBuf>,

    /// Value of HADOOP_HOME for the child process
    pub hadoop_home: PathBuf,

    /// Directory prepended to the inherited PATH of the child process
    pub path_prefix: PathBuf,

    /// HiveServer2 JDBC URL (beeline only)
    pub jdbc_url: String,

    /// Run `SHOW DATABASES;` as part of the connection check
    pub probe: bool,

    /// Additional environment variables for the child process
    pub env: BTreeMap<String, String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            kind: EngineKind::default(),
            binary: None,
            hadoop_home: PathBuf::from("/usr/local/hadoop"),
            path_prefix: PathBuf::from("/usr/local/hadoop/bin"),
            jdbc_url: "jdbc:hive2://localhost:10000/default".to_string(),
            probe: false,
            env: BTreeMap::new(),
        }
    }
}

impl EngineConfig {
    /// Executable to invoke, falling back to the stock install location
    pub fn binary_path(&self) -> PathBuf {
        match (&self.binary, self.kind) {
            (Some(binary), _) => binary.clone(),
            (None, EngineKind::HiveCli) => PathBuf::from("/usr/local/hive/bin/hive"),
            (None, EngineKind::Beeline) => PathBuf::from("/usr/local/hive/bin/beeline"),
        }
    }
}

/// What the ingestion loop does when a message cannot be applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorPolicy {
    /// Stop on the first error of any kind
    FailFast,

    /// Log the failure, commit the message and move on
    SkipMessage,

    /// Record the message in the dead-letter file, then move on
    DeadLetter,
}

impl Default for ErrorPolicy {
    fn default() -> Self {
        Self::FailFast
    }
}

/// How database, table and column names are checked before rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdentifierPolicy {
    /// Reject anything that is not `[A-Za-z_][A-Za-z0-9_]*`
    Validate,

    /// Accept any non-empty name and wrap it in backticks
    Quote,
}

impl Default for IdentifierPolicy {
    fn default() -> Self {
        Self::Validate
    }
}

/// Ingestion loop settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Failure handling
    pub on_error: ErrorPolicy,

    /// JSON-lines file receiving dead letters (required for `dead-letter`)
    pub dead_letter_path: Option<PathBuf>,

    /// Identifier checking
    pub identifiers: IdentifierPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            on_error: ErrorPolicy::default(),
            dead_letter_path: None,
            identifiers: IdentifierPolicy::default(),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Kafka consumer
    #[serde(default)]
    pub kafka: KafkaConfig,

    /// Execution engine
    #[serde(default)]
    pub engine: EngineConfig,

    /// Ingestion loop
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Directory of the config file (for resolving relative paths)
    #[serde(skip)]
    pub project_root: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            kafka: KafkaConfig::default(),
            engine: EngineConfig::default(),
            pipeline: PipelineConfig::default(),
            project_root: std::env::current_dir().unwrap_or_default(),
        }
    }
}

impl Config {
    /// Load config from TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(format!("{}: {}", path.display(), e)))?;

        let mut config = Self::from_toml(&contents)?;

        // Set project root to parent of config file
        if let Some(parent) = path.parent() {
            config.project_root = parent.to_path_buf();
        }

        Ok(config)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        let mut config: Config = toml::from_str(toml)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.project_root = std::env::current_dir().unwrap_or_default();
        Ok(config)
    }

    /// Save config to TOML file
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let toml = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, toml)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Apply `SCHEMAFERRY_*` overrides from the process environment
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(brokers) = lookup(ENV_BROKERS) {
            self.kafka.brokers = brokers
                .split(',')
                .map(str::trim)
                .filter(|b| !b.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(topic) = lookup(ENV_TOPIC) {
            self.kafka.topic = topic;
        }
        if let Some(group_id) = lookup(ENV_GROUP_ID) {
            self.kafka.group_id = group_id;
        }
    }

    /// Resolve a possibly relative path against the config directory
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_root.join(path)
        }
    }

    /// Dead-letter file, resolved against the config directory
    pub fn dead_letter_path(&self) -> Option<PathBuf> {
        self.pipeline
            .dead_letter_path
            .as_deref()
            .map(|p| self.resolve_path(p))
    }

    /// Check cross-field constraints serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.kafka.brokers.is_empty() {
            return Err(ConfigError::Invalid("kafka.brokers must not be empty".to_string()));
        }
        if self.kafka.topic.trim().is_empty() {
            return Err(ConfigError::Invalid("kafka.topic must not be empty".to_string()));
        }
        if self.pipeline.on_error == ErrorPolicy::DeadLetter
            && self.pipeline.dead_letter_path.is_none()
        {
            return Err(ConfigError::Invalid(
                "pipeline.on_error = \"dead-letter\" requires pipeline.dead_letter_path".to_string(),
            ));
        }
        Ok(())
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
