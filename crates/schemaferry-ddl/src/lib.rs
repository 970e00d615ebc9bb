//! SchemaFerry DDL synthesis
//!
//! Turns a decoded [`schemaferry_core::Schema`] into Hive statements:
//! - [`database_ddl`] / [`table_ddl`] render the raw text with no checks
//! - [`DdlSynthesizer`] checks identifiers and table shape first and
//!   produces the ordered statement plan the ingestor executes

pub mod render;
pub mod identifier;
pub mod synthesizer;

pub use render::{database_ddl, table_ddl};
pub use identifier::IdentifierKind;
pub use synthesizer::{DdlSynthesizer, DdlError, Statement, StatementTarget};
