//! Identifier checking and quoting

use regex::Regex;
use schemaferry_core::IdentifierPolicy;
use std::fmt;
use std::sync::OnceLock;

use crate::synthesizer::DdlError;

/// What a name identifies, for error messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    Database,
    Table,
    Column,
}

impl fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Database => write!(f, "database"),
            Self::Table => write!(f, "table"),
            Self::Column => write!(f, "column"),
        }
    }
}

fn plain_identifier() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid")
    })
}

/// Hive reserved keywords, which cannot appear unquoted as identifiers
const RESERVED_WORDS: &[&str] = &[
    "all", "alter", "and", "array", "as", "authorization", "between", "bigint", "binary",
    "boolean", "both", "by", "cache", "case", "cast", "char", "column", "commit", "conf",
    "constraint", "create", "cross", "cube", "current", "current_date", "current_timestamp",
    "cursor", "database", "date", "dayofweek", "decimal", "delete", "describe", "distinct",
    "double", "drop", "else", "end", "exchange", "exists", "extended", "external", "extract",
    "false", "fetch", "float", "floor", "following", "for", "foreign", "from", "full",
    "function", "grant", "group", "grouping", "having", "if", "import", "in", "inner",
    "insert", "int", "integer", "intersect", "interval", "into", "is", "join", "lateral",
    "left", "less", "like", "local", "macro", "map", "more", "none", "not", "null",
    "numeric", "of", "on", "only", "or", "order", "out", "outer", "over", "partialscan",
    "partition", "percent", "preceding", "precision", "preserve", "primary", "procedure",
    "range", "reads", "reduce", "references", "regexp", "revoke", "right", "rlike",
    "rollback", "rollup", "row", "rows", "select", "set", "smallint", "start", "sync",
    "table", "tablesample", "then", "time", "timestamp", "to", "transform", "trigger",
    "true", "truncate", "unbounded", "union", "uniquejoin", "update", "user", "using",
    "utc_tmestamp", "values", "varchar", "views", "when", "where", "window", "with",
];

/// Whether `name` is a Hive reserved keyword (case-insensitive)
pub fn is_reserved(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    RESERVED_WORDS.contains(&lower.as_str())
}

/// Render `name` for inclusion in DDL under `policy`
///
/// `Validate` emits names unquoted, so reserved words are rejected there;
/// `Quote` accepts them.
pub fn render(
    policy: IdentifierPolicy,
    kind: IdentifierKind,
    name: &str,
) -> Result<String, DdlError> {
    match policy {
        IdentifierPolicy::Validate => {
            if !plain_identifier().is_match(name) {
                Err(DdlError::InvalidIdentifier {
                    kind,
                    name: name.to_string(),
                })
            } else if is_reserved(name) {
                Err(DdlError::ReservedWord {
                    kind,
                    name: name.to_string(),
                })
            } else {
                Ok(name.to_string())
            }
        }
        IdentifierPolicy::Quote => {
            if name.is_empty() {
                return Err(DdlError::InvalidIdentifier {
                    kind,
                    name: String::new(),
                });
            }
            Ok(format!("`{}`", name.replace('`', "``")))
        }
    }
}
