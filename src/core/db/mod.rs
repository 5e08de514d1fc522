/// Database Module
///
/// The SQLite access layer used by the inspector.
///
/// ## Architecture
///
/// - **Connection Management** (`connection.rs`): read-only open and explicit close
/// - **Schema Introspection** (`schema.rs`): the table catalog
/// - **Query Execution** (`query.rs`): count and row snapshot of the target table
///
/// All operations return the crate-wide `InspectError`.
pub mod connection;
pub mod query;
pub mod schema;

pub use connection::*;
pub use query::*;
pub use schema::*;
