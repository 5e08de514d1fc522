/// dbpeek Error Module
///
/// This module defines the closed set of failures an inspection can end in.
/// Each variant maps to one user-visible outcome, so callers can decide the
/// exit status without parsing messages.
use std::path::PathBuf;
use thiserror::Error;

/// Error type for the dbpeek inspector.
#[derive(Error, Debug)]
pub enum InspectError {
    /// The database file does not exist. Raised before any connection is made.
    #[error("Database file not found at {}", .0.display())]
    NotFound(PathBuf),

    /// Connection-level failures: open, catalog read, corrupt or locked files
    #[error("{0}")]
    Open(#[source] rusqlite::Error),

    /// The target table could not be queried
    #[error("Error querying {table} table: {source}")]
    Query {
        table: String,
        #[source]
        source: rusqlite::Error,
    },

    /// Configuration loading and validation errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// TOML parsing errors from a config file
    #[error("Configuration error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Writing the report failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl InspectError {
    /// Short machine-readable tag used by the JSON report.
    pub fn kind(&self) -> &'static str {
        match self {
            InspectError::NotFound(_) => "not_found",
            InspectError::Open(_) => "open",
            InspectError::Query { .. } => "query",
            InspectError::Config(_) | InspectError::Toml(_) => "config",
            InspectError::Io(_) => "io",
        }
    }

    /// Whether a target-table failure can be reported and skipped.
    ///
    /// Only the generic `SQLITE_ERROR` code (missing table, bad SQL) is
    /// recoverable. Busy, locked, corrupt and I/O codes say the connection
    /// itself is unusable.
    pub fn is_recoverable(&self) -> bool {
        match self {
            InspectError::Query { source, .. } => Self::is_sql_error(source),
            _ => false,
        }
    }

    /// `SQLITE_ERROR`, the code SQLite uses for bad statements
    pub fn is_sql_error(err: &rusqlite::Error) -> bool {
        matches!(
            err,
            rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::Unknown
        )
    }

    /// Converts a non-recoverable query failure into a connection failure.
    pub fn escalate(self) -> Self {
        match self {
            InspectError::Query { source, .. } => InspectError::Open(source),
            other => other,
        }
    }
}

/// Type alias for Result to use InspectError as the error type.
pub type Result<T> = std::result::Result<T, InspectError>;
