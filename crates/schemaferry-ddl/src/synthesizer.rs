//! Checked statement planning

use schemaferry_core::{map_type, IdentifierPolicy, Schema, Table};
use std::fmt;

use crate::identifier::{self, IdentifierKind};
use crate::render::create_table;

/// Errors raised while turning a schema into statements
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DdlError {
    #[error("Invalid {kind} identifier: {name:?}")]
    InvalidIdentifier { kind: IdentifierKind, name: String },

    #[error("Invalid {kind} identifier: {name:?} is a Hive reserved word (set pipeline.identifiers = \"quote\")")]
    ReservedWord { kind: IdentifierKind, name: String },

    #[error("Table {database}.{table} has no columns")]
    EmptyTable { database: String, table: String },
}

/// The object a statement creates
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementTarget {
    Database(String),
    Table { database: String, table: String },
}

impl fmt::Display for StatementTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Database(name) => write!(f, "database {}", name),
            Self::Table { database, table } => write!(f, "table {}.{}", database, table),
        }
    }
}

/// One DDL statement and what it creates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub target: StatementTarget,
    pub sql: String,
}

/// Builds Hive DDL after checking every identifier
#[derive(Debug, Clone, Copy, Default)]
pub struct DdlSynthesizer {
    identifiers: IdentifierPolicy,
}

impl DdlSynthesizer {
    pub fn new(identifiers: IdentifierPolicy) -> Self {
        Self { identifiers }
    }

    pub fn identifier_policy(&self) -> IdentifierPolicy {
        self.identifiers
    }

    /// `CREATE DATABASE IF NOT EXISTS` for `database_name`
    pub fn database(&self, database_name: &str) -> Result<Statement, DdlError> {
        let name = identifier::render(self.identifiers, IdentifierKind::Database, database_name)?;

        Ok(Statement {
            target: StatementTarget::Database(database_name.to_string()),
            sql: format!("CREATE DATABASE IF NOT EXISTS {};", name),
        })
    }

    /// `CREATE TABLE IF NOT EXISTS` for one table
    ///
    /// Tables without columns are rejected rather than rendered.
    pub fn table(&self, database_name: &str, table: &Table) -> Result<Statement, DdlError> {
        let database = identifier::render(self.identifiers, IdentifierKind::Database, database_name)?;
        let table_name = identifier::render(self.identifiers, IdentifierKind::Table, &table.name)?;

        if table.columns.is_empty() {
            return Err(DdlError::EmptyTable {
                database: database_name.to_string(),
                table: table.name.clone(),
            });
        }

        let columns = table
            .columns
            .iter()
            .map(|c| {
                identifier::render(self.identifiers, IdentifierKind::Column, &c.name)
                    .map(|name| (name, map_type(&c.data_type), c.is_nullable))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Statement {
            target: StatementTarget::Table {
                database: database_name.to_string(),
                table: table.name.clone(),
            },
            sql: create_table(&format!("{}.{}", database, table_name), columns),
        })
    }

    /// Every statement for `schema`: the database first, then tables in order
    ///
    /// Fails as a whole if any table is invalid, so nothing runs for a
    /// message that cannot be fully rendered.
    pub fn plan(&self, schema: &Schema) -> Result<Vec<Statement>, DdlError> {
        let mut statements = Vec::with_capacity(schema.tables.len() + 1);
        statements.push(self.database(&schema.database_name)?);

        for table in &schema.tables {
            statements.push(self.table(&schema.database_name, table)?);
        }

        Ok(statements)
    }
}
