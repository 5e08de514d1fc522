//! Report rendering for an inspection outcome.
//!
//! The text form is line-oriented and stable across runs; the JSON form is a
//! single pretty-printed document.

use crate::config::OutputFormat;
use crate::core::db::TableSnapshot;
use crate::core::{InspectError, Result};
use crate::inspector::{Inspection, TargetOutcome};
use serde_json::{json, Value};
use std::io::Write;
use std::path::Path;

/// Writes the report for `outcome` in the requested format.
pub fn write_report<W: Write>(
    out: &mut W,
    format: OutputFormat,
    path: &Path,
    outcome: &Result<Inspection>,
) -> Result<()> {
    match format {
        OutputFormat::Text => out.write_all(render_text(outcome).as_bytes())?,
        OutputFormat::Json => {
            let doc = render_json(path, outcome);
            let pretty = serde_json::to_string_pretty(&doc).map_err(std::io::Error::from)?;
            writeln!(out, "{}", pretty)?;
        }
    }
    out.flush()?;
    Ok(())
}

/// Renders the text report, one item per line.
pub fn render_text(outcome: &Result<Inspection>) -> String {
    let mut lines = Vec::new();

    match outcome {
        Ok(inspection) => {
            if inspection.tables.is_empty() {
                lines.push("Tables: (none)".to_string());
            } else {
                lines.push(format!("Tables: {}", inspection.tables.join(", ")));
            }

            match &inspection.target {
                TargetOutcome::Found(snapshot) => {
                    lines.push(format!("{} count: {}", snapshot.name, snapshot.count));
                    lines.extend(snapshot.rows.iter().map(|row| {
                        let cells: Vec<String> = row.iter().map(ToString::to_string).collect();
                        format!("({})", cells.join(", "))
                    }));
                }
                TargetOutcome::Unavailable { table, reason } => {
                    lines.push(format!("Error querying {} table: {}", table, reason));
                }
            }
        }
        Err(e @ InspectError::Open(_)) | Err(e @ InspectError::Query { .. }) => {
            lines.push(format!("Error connecting to database: {}", e));
        }
        Err(e) => lines.push(e.to_string()),
    }

    let mut text = lines.join("\n");
    text.push('\n');
    text
}

/// Builds the JSON report document.
pub fn render_json(path: &Path, outcome: &Result<Inspection>) -> Value {
    let path = path.display().to_string();

    match outcome {
        Ok(inspection) => json!({
            "path": path,
            "tables": inspection.tables,
            "target": target_json(&inspection.target),
        }),
        Err(e) => json!({
            "path": path,
            "error": {
                "kind": e.kind(),
                "message": e.to_string(),
            },
        }),
    }
}

fn target_json(target: &TargetOutcome) -> Value {
    match target {
        TargetOutcome::Found(snapshot) => snapshot_json(snapshot),
        TargetOutcome::Unavailable { table, reason } => json!({
            "table": table,
            "error": reason,
        }),
    }
}

fn snapshot_json(snapshot: &TableSnapshot) -> Value {
    let rows: Vec<Value> = snapshot
        .rows
        .iter()
        .map(|row| Value::Array(row.iter().map(|cell| cell.to_json()).collect()))
        .collect();

    json!({
        "table": snapshot.name,
        "count": snapshot.count,
        "columns": snapshot.columns,
        "rows": rows,
    })
}
