/// Core Module for dbpeek
///
/// Shared infrastructure for the inspector: the error taxonomy and the
/// SQLite access layer.

pub mod db;
pub mod error;

// Re-export commonly used types for convenience
pub use error::{InspectError, Result};
