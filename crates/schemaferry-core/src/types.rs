//! Source-to-Hive type mapping
//!
//! The mapping is a closed, hand-maintained table. Unknown source types
//! never fail; they degrade to `STRING`.

use serde::{Deserialize, Serialize};

/// Hive column types produced by the mapper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HiveType {
    /// Integer type (all source integer widths)
    Int,

    /// String type, also the fallback
    String,

    /// Floating point (float, double and decimal)
    Double,

    /// Timestamp (date and time source types)
    Timestamp,
}

impl HiveType {
    /// Type used for any unrecognized source type
    pub const FALLBACK: HiveType = HiveType::String;

    /// Hive type name as written in DDL
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Int => "INT",
            Self::String => "STRING",
            Self::Double => "DOUBLE",
            Self::Timestamp => "TIMESTAMP",
        }
    }
}

impl std::fmt::Display for HiveType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn lookup(source_type: &str) -> Option<HiveType> {
    match source_type.trim().to_ascii_lowercase().as_str() {
        "int" | "smallint" | "mediumint" | "bigint" => Some(HiveType::Int),
        "varchar" | "char" | "text" => Some(HiveType::String),
        "float" | "double" | "decimal" => Some(HiveType::Double),
        "date" | "datetime" | "timestamp" => Some(HiveType::Timestamp),
        _ => None,
    }
}

/// Map a source column type name to its Hive type
///
/// The name is lower-cased before matching, so `BIGINT` and `bigint` agree.
/// Parameterized names such as `varchar(255)` are not in the table and take
/// the fallback.
pub fn map_type(source_type: &str) -> HiveType {
    lookup(source_type).unwrap_or(HiveType::FALLBACK)
}

/// Whether `source_type` is in the mapping table (i.e. not a fallback)
pub fn is_known_type(source_type: &str) -> bool {
    lookup(source_type).is_some()
}
