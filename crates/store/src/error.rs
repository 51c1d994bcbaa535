//! Error types for the table engine.

use std::{io, path::PathBuf};

use simpledb_types::{CodecError, RowId};
use snafu::Snafu;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during table engine operations.
///
/// Integrity failures carry the table name and the offending field or
/// rule so callers can render a precise message. A failed mutation
/// leaves the table's in-memory state and backing file as they were
/// before the call.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// A field failed a declared constraint.
    #[snafu(display("invalid row for table {table}: field {field} {rule}"))]
    InvalidField {
        /// The table being mutated.
        table: &'static str,
        /// The field that failed.
        field: &'static str,
        /// Description of the violated rule.
        rule: String,
    },

    /// A lifecycle trigger refused the mutation for a domain reason.
    #[snafu(display("mutation rejected for table {table}: {reason}"))]
    Vetoed {
        /// The table being mutated.
        table: &'static str,
        /// The trigger's reason.
        reason: String,
    },

    /// A declared unique index already contains the candidate value.
    #[snafu(display("unique index {index} on table {table} already contains {value:?}"))]
    UniqueIndex {
        /// The table being mutated.
        table: &'static str,
        /// The violated index.
        index: &'static str,
        /// The colliding value.
        value: String,
    },

    /// A foreign-key field points at a row that does not exist.
    #[snafu(display(
        "field {field} on table {table} references missing row {id} in table {references}"
    ))]
    UnresolvedReference {
        /// The dependent table.
        table: &'static str,
        /// The foreign-key field.
        field: &'static str,
        /// The unresolvable id.
        id: RowId,
        /// The referenced table.
        references: &'static str,
    },

    /// A delete was blocked because a dependent row still references the target.
    #[snafu(display(
        "cannot delete row {id} from table {table}: still referenced by {dependent}.{field}"
    ))]
    StillReferenced {
        /// The table being deleted from.
        table: &'static str,
        /// The id of the row being deleted.
        id: RowId,
        /// The dependent table holding the reference.
        dependent: &'static str,
        /// The dependent's foreign-key field.
        field: &'static str,
    },

    /// Update or delete addressed an id with no persisted row.
    #[snafu(display("no persisted row with id {id} in table {table}"))]
    RowNotFound {
        /// The table addressed.
        table: &'static str,
        /// The missing id.
        id: RowId,
    },

    /// A table was looked up that was never registered at bootstrap.
    #[snafu(display("table {table} is not registered"))]
    UnknownTable {
        /// The requested table name.
        table: String,
    },

    /// Two registrations claimed the same table name.
    #[snafu(display("table {table} is already registered"))]
    AlreadyRegistered {
        /// The duplicated table name.
        table: &'static str,
    },

    /// Table-lock acquisition exceeded the configured timeout.
    ///
    /// Treated as a detected deadlock: a programming defect in
    /// cross-table trigger ordering, not a recoverable condition.
    #[snafu(display("timed out acquiring lock on table {table} after {timeout_ms} ms"))]
    LockTimeout {
        /// The contended table.
        table: &'static str,
        /// The configured timeout.
        timeout_ms: u64,
    },

    /// The database handle behind a table store has been dropped.
    #[snafu(display("database has been closed"))]
    Closed,

    /// I/O error on a table's backing file.
    #[snafu(display("I/O error on {}: {source}", path.display()))]
    Io {
        /// The file involved.
        path: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },

    /// Record serialization or deserialization failed.
    #[snafu(display("Codec error: {source}"))]
    Codec {
        /// The underlying codec error.
        source: CodecError,
    },

    /// A backing file is malformed.
    #[snafu(display("corrupted table file {}: {reason}", path.display()))]
    Corrupted {
        /// The file involved.
        path: PathBuf,
        /// Description of what was malformed.
        reason: String,
    },
}
