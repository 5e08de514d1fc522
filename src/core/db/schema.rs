/// Schema Introspection Module
///
/// Reads the table catalog. Any failure here is treated as connection-level,
/// because it is the first statement run against a freshly opened file.

use crate::core::{InspectError, Result};
use rusqlite::Connection;
use tracing::debug;

const CATALOG_SQL: &str = "SELECT name FROM sqlite_master WHERE type='table'";

/// Lists every table in catalog order, internal `sqlite_*` tables included.
pub fn list_tables(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(CATALOG_SQL).map_err(InspectError::Open)?;
    let tables = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .map_err(InspectError::Open)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(InspectError::Open)?;

    debug!("Catalog lists {} tables", tables.len());
    Ok(tables)
}

/// Quotes a table name for interpolation into SQL.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
