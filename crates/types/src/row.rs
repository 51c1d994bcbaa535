//! The row contract shared by every table.

use serde::{de::DeserializeOwned, Serialize};

/// Row identity type: a 64-bit signed integer, unique within one table.
pub type RowId = i64;

/// Sentinel identity carried by rows that have not been inserted yet.
///
/// A freshly constructed row holds this value; the table store replaces
/// it with the next primary-sequence value on first insert. Rows whose
/// identity was minted elsewhere keep their caller-supplied id.
pub const TRANSIENT_ROW_ID: RowId = -1;

/// Capability contract a type must satisfy to be stored in a table.
///
/// A row type names its table, exposes its identity field, and is
/// serializable so the table store can persist it. Equality of field
/// projections (used by unique indexes) is expressed per-table in the
/// table's spec, not here.
pub trait Row: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// Table name; also the stem of the table's backing file.
    const TABLE: &'static str;

    /// Returns the row's current identity.
    fn id(&self) -> RowId;

    /// Assigns the row's identity. Called once, by the first insert.
    fn set_id(&mut self, id: RowId);

    /// True until the row has been through a successful insert.
    fn is_transient(&self) -> bool {
        self.id() == TRANSIENT_ROW_ID
    }
}
