/// Connection Management Module
///
/// Opens the inspected database without write access and closes it
/// explicitly on the success path. Every other path releases the handle when
/// the `ReadOnlyConnection` is dropped.

use crate::core::{InspectError, Result};
use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A read-only handle on a database file
#[derive(Debug)]
pub struct ReadOnlyConnection {
    conn: Connection,
    path: PathBuf,
}

impl ReadOnlyConnection {
    /// Opens the database at `path` read-only.
    ///
    /// SQLite opens lazily, so a file that is not a database only fails on
    /// the first statement, not here.
    ///
    /// # Errors
    ///
    /// Returns `InspectError::Open` if SQLite refuses the file (permissions,
    /// a directory, an unsupported VFS).
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("Opening {} read-only", path.display());

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(InspectError::Open)?;

        Ok(ReadOnlyConnection {
            conn,
            path: path.to_path_buf(),
        })
    }

    /// The underlying rusqlite connection
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Path the connection was opened on
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Closes the connection, surfacing any error SQLite reports on close.
    ///
    /// If closing fails the handle is still dropped. The error is SQLite's
    /// own: a close failure happens after everything has been read, so it is
    /// not a connection failure.
    pub fn close(self) -> rusqlite::Result<()> {
        let path = self.path;
        self.conn.close().map_err(|(conn, e)| {
            warn!("Failed to close {}: {}", path.display(), e);
            drop(conn);
            e
        })?;
        debug!("Closed {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::{tempdir, NamedTempFile};

    #[test]
    fn test_open_and_close() {
        let file = NamedTempFile::new().unwrap();
        Connection::open(file.path())
            .unwrap()
            .execute_batch("CREATE TABLE t (id INTEGER);")
            .unwrap();

        let conn = ReadOnlyConnection::open(file.path()).unwrap();
        assert_eq!(conn.path(), file.path());
        let count: i64 = conn
            .connection()
            .query_row("SELECT count(*) FROM t", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);

        let closed: rusqlite::Result<()> = conn.close();
        assert!(closed.is_ok());
    }

    #[test]
    fn test_connection_is_read_only() {
        let file = NamedTempFile::new().unwrap();
        Connection::open(file.path())
            .unwrap()
            .execute_batch("CREATE TABLE t (id INTEGER);")
            .unwrap();

        let conn = ReadOnlyConnection::open(file.path()).unwrap();
        let result = conn.connection().execute("INSERT INTO t VALUES (1)", []);
        assert!(result.is_err());
    }

    #[test]
    fn test_open_does_not_create_missing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.db");

        let result = ReadOnlyConnection::open(&path);
        match result.unwrap_err() {
            InspectError::Open(_) => {}
            other => panic!("Expected Open error, got {:?}", other),
        }
        assert!(!path.exists());
    }
}
