//! Schema message types
//!
//! One [`Schema`] is decoded from every queue message. The JSON shape is:
//!
//! ```json
//! {
//!   "database_name": "sales",
//!   "tables": [
//!     {
//!       "name": "orders",
//!       "columns": [
//!         {"name": "id", "data_type": "int", "is_nullable": false, "is_primary": true}
//!       ]
//!     }
//!   ]
//! }
//! ```

use serde::{Deserialize, Deserializer, Serialize};

/// A column as described by the upstream (source database) schema
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Column {
    /// Column name
    pub name: String,

    /// Source engine type name, free-form (e.g. "varchar", "bigint")
    pub data_type: String,

    /// Whether the column accepts NULL
    #[serde(default)]
    pub is_nullable: bool,

    /// Primary key flag. Decoded and carried along, not rendered into DDL.
    #[serde(default)]
    pub is_primary: bool,
}

impl Column {
    /// Create a new nullable, non-primary column
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            is_nullable: true,
            is_primary: false,
        }
    }

    /// Set nullability
    pub fn with_nullable(mut self, is_nullable: bool) -> Self {
        self.is_nullable = is_nullable;
        self
    }

    /// Mark as (part of) the primary key
    pub fn with_primary(mut self, is_primary: bool) -> Self {
        self.is_primary = is_primary;
        self
    }
}

/// Producers that encode an empty list as `null` get the same result as
/// omitting the field.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// A table with an ordered list of columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// Table name
    pub name: String,

    /// Columns in DDL order
    #[serde(default, deserialize_with = "null_as_empty")]
    pub columns: Vec<Column>,
}

impl Table {
    /// Create a table from columns
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    /// Find a column by name
    pub fn find_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Get column names in order
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}

/// A database and its tables, the payload of one schema message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Target database name
    pub database_name: String,

    /// Tables in creation order
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tables: Vec<Table>,
}

impl Schema {
    /// Create a schema for a database
    pub fn new(database_name: impl Into<String>, tables: Vec<Table>) -> Self {
        Self {
            database_name: database_name.into(),
            tables,
        }
    }

    /// Decode a schema message from raw bytes
    pub fn from_slice(payload: &[u8]) -> Result<Self, DecodeError> {
        if payload.is_empty() {
            return Err(DecodeError::EmptyPayload);
        }
        serde_json::from_slice(payload).map_err(DecodeError::from)
    }

    /// Decode a schema message from a JSON string
    pub fn from_json(json: &str) -> Result<Self, DecodeError> {
        Self::from_slice(json.as_bytes())
    }

    /// Encode back to JSON
    pub fn to_json(&self) -> Result<String, DecodeError> {
        serde_json::to_string(self).map_err(DecodeError::from)
    }

    /// Get table names in order
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.name.as_str()).collect()
    }

    /// Find a table by name
    pub fn find_table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }
}

/// Failure to decode a schema message
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("Empty message payload")]
    EmptyPayload,

    #[error("Invalid schema JSON at line {line}, column {column}: {message}")]
    InvalidJson {
        line: usize,
        column: usize,
        message: String,
    },
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidJson {
            line: err.line(),
            column: err.column(),
            message: err.to_string(),
        }
    }
}
