//! SchemaFerry Core
//!
//! Domain model shared by every SchemaFerry crate: the schema message
//! decoded from the queue, the source-to-Hive type mapping and the
//! `schemaferry.toml` configuration.

pub mod schema;
pub mod types;
pub mod config;

pub use schema::{Column, Table, Schema, DecodeError};
pub use types::{HiveType, map_type, is_known_type};
pub use config::{
    Config, ConfigError, KafkaConfig, EngineConfig, EngineKind, PipelineConfig, ErrorPolicy,
    IdentifierPolicy,
};
