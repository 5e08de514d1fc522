//! The inspection routine: existence check, read-only open, catalog listing,
//! target-table dump, close.

use crate::config::{InspectConfig, OpenFailurePolicy};
use crate::core::db::{list_tables, snapshot_table, ReadOnlyConnection, TableSnapshot};
use crate::core::{InspectError, Result};
use crate::report;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info, warn};

/// What happened to the target table
#[derive(Debug, Clone, PartialEq)]
pub enum TargetOutcome {
    /// The table was read
    Found(TableSnapshot),
    /// The table could not be queried; the run continued
    Unavailable { table: String, reason: String },
}

/// Everything one successful inspection observed
#[derive(Debug, Clone, PartialEq)]
pub struct Inspection {
    pub path: PathBuf,
    pub tables: Vec<String>,
    pub target: TargetOutcome,
}

/// Process status of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Success,
    Failure,
}

impl RunStatus {
    pub fn code(self) -> u8 {
        match self {
            RunStatus::Success => 0,
            RunStatus::Failure => 1,
        }
    }
}

impl From<RunStatus> for ExitCode {
    fn from(status: RunStatus) -> Self {
        ExitCode::from(status.code())
    }
}

/// Read-only inspector for one database file
#[derive(Debug, Clone)]
pub struct Inspector {
    config: InspectConfig,
}

impl Inspector {
    pub fn new(config: InspectConfig) -> Self {
        Inspector { config }
    }

    pub fn config(&self) -> &InspectConfig {
        &self.config
    }

    /// Runs the inspection and returns what it saw.
    ///
    /// A target table that cannot be queried because of a plain SQL error
    /// (usually "no such table") is reported inside the `Inspection`. Every
    /// other failure ends the inspection.
    ///
    /// # Errors
    ///
    /// - `InspectError::NotFound` if the path does not exist; nothing is opened.
    /// - `InspectError::Open` if the file cannot be opened, its catalog cannot
    ///   be read, or the target query fails for a non-SQL reason.
    pub fn inspect(&self) -> Result<Inspection> {
        let path = &self.config.path;
        if !path.exists() {
            info!("{} does not exist", path.display());
            return Err(InspectError::NotFound(path.clone()));
        }

        let conn = ReadOnlyConnection::open(path)?;
        let tables = list_tables(conn.connection())?;
        info!("{} has {} tables", path.display(), tables.len());

        let target = match snapshot_table(conn.connection(), &self.config.table) {
            Ok(snapshot) => TargetOutcome::Found(snapshot),
            Err(InspectError::Query { table, source })
                if InspectError::is_sql_error(&source) =>
            {
                warn!("Cannot query {}: {}", table, source);
                TargetOutcome::Unavailable {
                    table,
                    reason: source.to_string(),
                }
            }
            Err(e) => return Err(e.escalate()),
        };

        // A failed close is already logged and does not change what was read.
        if let Err(e) = conn.close() {
            debug!("Ignoring close failure for {}: {}", path.display(), e);
        }

        Ok(Inspection {
            path: path.clone(),
            tables,
            target,
        })
    }

    /// Inspects, writes the report to `out`, and picks the exit status.
    pub fn run<W: Write>(&self, out: &mut W) -> Result<RunStatus> {
        let outcome = self.inspect();
        report::write_report(out, self.config.format, &self.config.path, &outcome)?;
        Ok(self.status_for(&outcome))
    }

    fn status_for(&self, outcome: &Result<Inspection>) -> RunStatus {
        match outcome {
            Ok(_) => RunStatus::Success,
            Err(InspectError::Open(_)) | Err(InspectError::Query { .. }) => {
                match self.config.open_failure {
                    OpenFailurePolicy::Report => RunStatus::Success,
                    OpenFailurePolicy::Fail => RunStatus::Failure,
                }
            }
            Err(_) => RunStatus::Failure,
        }
    }
}
