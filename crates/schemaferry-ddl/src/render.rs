//! Raw DDL rendering
//!
//! Names are spliced in as given. Callers that take names from untrusted
//! messages go through [`crate::DdlSynthesizer`] instead.

use schemaferry_core::{map_type, HiveType, Table};

/// `CREATE DATABASE IF NOT EXISTS <name>;`
pub fn database_ddl(database_name: &str) -> String {
    format!("CREATE DATABASE IF NOT EXISTS {};", database_name)
}

/// `CREATE TABLE IF NOT EXISTS <db>.<table> (...)` with one line per column
///
/// A table without columns keeps its parentheses and renders `(\n\n);`
/// rather than collapsing to `<db>.<table> \n);`. Hive rejects both.
pub fn table_ddl(database_name: &str, table: &Table) -> String {
    let qualified = format!("{}.{}", database_name, table.name);
    let columns = table
        .columns
        .iter()
        .map(|c| (c.name.clone(), map_type(&c.data_type), c.is_nullable));

    create_table(&qualified, columns)
}

/// Shared by the raw and checked paths. Identifiers arrive already rendered.
pub(crate) fn create_table<I>(qualified_name: &str, columns: I) -> String
where
    I: IntoIterator<Item = (String, HiveType, bool)>,
{
    let lines: Vec<String> = columns
        .into_iter()
        .map(|(name, hive_type, is_nullable)| {
            if is_nullable {
                format!("  {} {}", name, hive_type)
            } else {
                format!("  {} {} NOT NULL", name, hive_type)
            }
        })
        .collect();

    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n{}\n);",
        qualified_name,
        lines.join(",\n")
    )
}
