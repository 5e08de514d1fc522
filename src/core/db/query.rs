/// Query Execution Module
///
/// Reads the target table: a `count(*)` followed by a full `SELECT *` in the
/// database's native order. Values are copied out of SQLite into owned
/// `CellValue`s so the snapshot outlives the connection.

use super::schema::quote_identifier;
use crate::core::{InspectError, Result};
use rusqlite::{types::ValueRef, Connection};
use std::fmt::{self, Write as _};
use tracing::debug;

/// One SQLite value, owned
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl From<ValueRef<'_>> for CellValue {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => CellValue::Null,
            ValueRef::Integer(i) => CellValue::Integer(i),
            ValueRef::Real(f) => CellValue::Real(f),
            ValueRef::Text(t) => CellValue::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => CellValue::Blob(b.to_vec()),
        }
    }
}

impl CellValue {
    /// JSON form of the value. Blobs become lowercase hex strings.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            CellValue::Null => serde_json::Value::Null,
            CellValue::Integer(i) => serde_json::Value::from(*i),
            CellValue::Real(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            CellValue::Text(t) => serde_json::Value::String(t.clone()),
            CellValue::Blob(b) => {
                serde_json::Value::String(b.iter().map(|byte| format!("{:02x}", byte)).collect())
            }
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => write!(f, "NULL"),
            CellValue::Integer(i) => write!(f, "{}", i),
            CellValue::Real(r) => write_real(f, *r),
            CellValue::Text(t) => write_quoted(f, t),
            CellValue::Blob(b) => write!(f, "<BLOB: {} bytes>", b.len()),
        }
    }
}

/// Reals always show they are reals: `2.0`, never `2`.
fn write_real(f: &mut fmt::Formatter<'_>, r: f64) -> fmt::Result {
    if !r.is_finite() {
        write!(f, "{}", r)
    } else if r != 0.0 && (r.abs() >= 1e16 || r.abs() < 1e-4) {
        write!(f, "{:e}", r)
    } else if r.fract() == 0.0 {
        write!(f, "{:.1}", r)
    } else {
        write!(f, "{}", r)
    }
}

/// Single-quoted text on one line: quotes doubled, control characters escaped.
fn write_quoted(f: &mut fmt::Formatter<'_>, t: &str) -> fmt::Result {
    f.write_char('\'')?;
    for c in t.chars() {
        match c {
            '\'' => f.write_str("''")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            c if c.is_control() => write!(f, "{}", c.escape_unicode())?,
            c => f.write_char(c)?,
        }
    }
    f.write_char('\'')
}

/// The contents of the target table at the time it was read
#[derive(Debug, Clone, PartialEq)]
pub struct TableSnapshot {
    /// Table name as requested
    pub name: String,
    /// Column names from `SELECT *`
    pub columns: Vec<String>,
    /// Result of `SELECT count(*)`
    pub count: u64,
    /// Every row, in the order SQLite returned them
    pub rows: Vec<Vec<CellValue>>,
}

/// Reads the row count and all rows of `table`.
///
/// Both reads run inside one deferred transaction so the count and the rows
/// come from the same snapshot of the file.
///
/// # Errors
///
/// Returns `InspectError::Query` carrying the table name for any SQLite
/// failure. Whether that failure is recoverable is decided by the caller.
pub fn snapshot_table(conn: &Connection, table: &str) -> Result<TableSnapshot> {
    let quoted = quote_identifier(table);
    let query_err = |source: rusqlite::Error| InspectError::Query {
        table: table.to_string(),
        source,
    };

    let tx = conn.unchecked_transaction().map_err(query_err)?;

    let count: i64 = tx
        .query_row(&format!("SELECT count(*) FROM {}", quoted), [], |row| row.get(0))
        .map_err(query_err)?;

    let (columns, rows) = {
        let mut stmt = tx
            .prepare(&format!("SELECT * FROM {}", quoted))
            .map_err(query_err)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let column_count = columns.len();

        let rows = stmt
            .query_map([], |row| {
                (0..column_count)
                    .map(|i| row.get_ref(i).map(CellValue::from))
                    .collect::<rusqlite::Result<Vec<_>>>()
            })
            .map_err(query_err)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(query_err)?;
        (columns, rows)
    };

    tx.commit().map_err(query_err)?;

    debug!("Read {} rows from {}", rows.len(), table);

    Ok(TableSnapshot {
        name: table.to_string(),
        columns,
        count: count.max(0) as u64,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_agent_table(conn: &Connection) {
        conn.execute_batch(
            "
            CREATE TABLE Agent (
                id INTEGER PRIMARY KEY,
                name TEXT,
                load REAL,
                avatar BLOB
            );
            INSERT INTO Agent VALUES (1, 'OMEGA-7', 0.5, X'48656C6C6F');
            INSERT INTO Agent VALUES (2, 'ZETA-9', NULL, NULL);
            INSERT INTO Agent VALUES (3, 'it''s', 2.0, NULL);
        ",
        )
        .unwrap();
    }

    #[test]
    fn test_snapshot_table() {
        let conn = Connection::open_in_memory().unwrap();
        setup_agent_table(&conn);

        let snapshot = snapshot_table(&conn, "Agent").unwrap();
        assert_eq!(snapshot.name, "Agent");
        assert_eq!(snapshot.columns, vec!["id", "name", "load", "avatar"]);
        assert_eq!(snapshot.count, 3);
        assert_eq!(snapshot.rows.len(), 3);
        assert_eq!(
            snapshot.rows[0],
            vec![
                CellValue::Integer(1),
                CellValue::Text("OMEGA-7".to_string()),
                CellValue::Real(0.5),
                CellValue::Blob(b"Hello".to_vec()),
            ]
        );
        assert_eq!(snapshot.rows[1][2], CellValue::Null);
    }

    #[test]
    fn test_snapshot_empty_table() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute("CREATE TABLE Agent (id INTEGER)", []).unwrap();

        let snapshot = snapshot_table(&conn, "Agent").unwrap();
        assert_eq!(snapshot.count, 0);
        assert!(snapshot.rows.is_empty());
        assert_eq!(snapshot.columns, vec!["id"]);
    }

    #[test]
    fn test_snapshot_missing_table() {
        let conn = Connection::open_in_memory().unwrap();

        let err = snapshot_table(&conn, "Agent").unwrap_err();
        assert!(err.is_recoverable());
        match err {
            InspectError::Query { table, source } => {
                assert_eq!(table, "Agent");
                assert!(source.to_string().contains("no such table"));
            }
            other => panic!("Expected Query error, got {:?}", other),
        }
    }

    #[test]
    fn test_snapshot_reads_in_one_transaction() {
        let conn = Connection::open_in_memory().unwrap();
        setup_agent_table(&conn);

        let snapshot = snapshot_table(&conn, "Agent").unwrap();
        assert_eq!(snapshot.count as usize, snapshot.rows.len());
        assert!(conn.is_autocommit(), "the read transaction must be closed");

        assert!(snapshot_table(&conn, "Ghost").is_err());
        assert!(conn.is_autocommit(), "a failed read must not leave a transaction open");
    }

    #[test]
    fn test_snapshot_text_and_real_rendering() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "
            CREATE TABLE Agent (load REAL, note TEXT);
            INSERT INTO Agent VALUES (2.0, 'line one' || char(10) || 'line two');
            INSERT INTO Agent VALUES (1e20, 'plain');
        ",
        )
        .unwrap();

        let snapshot = snapshot_table(&conn, "Agent").unwrap();
        let rendered: Vec<String> = snapshot
            .rows
            .iter()
            .map(|row| row.iter().map(ToString::to_string).collect::<Vec<_>>().join(", "))
            .collect();
        assert_eq!(rendered, vec!["2.0, 'line one\\nline two'", "1e20, 'plain'"]);
    }

    #[test]
    fn test_snapshot_quotes_table_name() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE \"agent list\" (id INTEGER); INSERT INTO \"agent list\" VALUES (7);",
        )
        .unwrap();

        let snapshot = snapshot_table(&conn, "agent list").unwrap();
        assert_eq!(snapshot.rows, vec![vec![CellValue::Integer(7)]]);
    }

    #[test]
    fn test_value_display() {
        assert_eq!(CellValue::Null.to_string(), "NULL");
        assert_eq!(CellValue::Integer(-4).to_string(), "-4");
        assert_eq!(CellValue::Real(123.45).to_string(), "123.45");
        assert_eq!(CellValue::Real(2.0).to_string(), "2.0");
        assert_eq!(CellValue::Real(-3.0).to_string(), "-3.0");
        assert_eq!(CellValue::Real(0.0).to_string(), "0.0");
        assert_eq!(CellValue::Real(1e20).to_string(), "1e20");
        assert_eq!(CellValue::Real(0.00001).to_string(), "1e-5");
        assert_eq!(CellValue::Text("a\nb".to_string()).to_string(), "'a\\nb'");
        assert_eq!(CellValue::Text("tab\there\r".to_string()).to_string(), "'tab\\there\\r'");
        assert_eq!(CellValue::Text("bell\u{7}".to_string()).to_string(), "'bell\\u{7}'");
        assert_eq!(CellValue::Text("back\\slash".to_string()).to_string(), "'back\\\\slash'");
        assert_eq!(CellValue::Text("café".to_string()).to_string(), "'café'");
        assert_eq!(CellValue::Text("it's".to_string()).to_string(), "'it''s'");
        assert_eq!(CellValue::Blob(vec![0; 5]).to_string(), "<BLOB: 5 bytes>");
    }

    #[test]
    fn test_value_json() {
        assert_eq!(CellValue::Null.to_json(), serde_json::Value::Null);
        assert_eq!(CellValue::Integer(3).to_json(), serde_json::json!(3));
        assert_eq!(CellValue::Real(0.5).to_json(), serde_json::json!(0.5));
        assert_eq!(CellValue::Text("x".into()).to_json(), serde_json::json!("x"));
        assert_eq!(CellValue::Blob(vec![0xde, 0xad]).to_json(), serde_json::json!("dead"));
    }
}
