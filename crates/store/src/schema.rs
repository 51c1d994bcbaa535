//! Per-table schema declarations.
//!
//! A [`TableSpec`] is built once at bootstrap and declares everything
//! the engine enforces for one table: the primary-sequence origin,
//! unique indexes, foreign keys, and field constraints. Extractors are
//! plain function pointers so a spec owns no captured state.

use simpledb_types::{FieldConstraint, Row, RowId};

/// What happens to dependent rows when a referenced row is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletePolicy {
    /// The delete fails while any dependent row still references the target.
    Block,
    /// Dependent rows are deleted first, through their own delete path.
    Cascade,
}

/// A declared unique index: a named projection that must be distinct
/// across all rows of the table.
///
/// Multi-field indexes compose their key string (the engine compares
/// keys for equality only).
pub struct UniqueIndex<R> {
    /// Index name, used in error messages.
    pub name: &'static str,
    /// Projects the indexed key out of a row.
    pub key: fn(&R) -> String,
}

/// A declared foreign key: a field whose value must resolve to an
/// existing row id in another table.
pub struct ForeignKey<R> {
    /// The foreign-key field name.
    pub field: &'static str,
    /// Projects the referenced id out of a row; `None` means "no
    /// reference" and is always valid.
    pub get: fn(&R) -> Option<RowId>,
    /// Name of the referenced table.
    pub references: &'static str,
    /// Delete policy enforced from the referenced table's side.
    pub on_delete: DeletePolicy,
}

/// Schema of one table: sequence origin plus declared guard rails.
pub struct TableSpec<R: Row> {
    pub(crate) sequence_origin: RowId,
    pub(crate) unique_indexes: Vec<UniqueIndex<R>>,
    pub(crate) foreign_keys: Vec<ForeignKey<R>>,
    pub(crate) constraints: Vec<FieldConstraint<R>>,
}

impl<R: Row> TableSpec<R> {
    /// A spec with no guard rails and the default sequence origin of 0.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sequence_origin: 0,
            unique_indexes: Vec::new(),
            foreign_keys: Vec::new(),
            constraints: Vec::new(),
        }
    }

    /// Sets the first id the primary sequence will allocate.
    ///
    /// Tables that interoperate with an external identity source use
    /// `RowId::MIN` so locally minted ids stay disjoint from the
    /// nonnegative ids minted elsewhere.
    #[must_use]
    pub fn sequence_origin(mut self, origin: RowId) -> Self {
        self.sequence_origin = origin;
        self
    }

    /// Declares a unique index.
    #[must_use]
    pub fn unique(mut self, name: &'static str, key: fn(&R) -> String) -> Self {
        self.unique_indexes.push(UniqueIndex { name, key });
        self
    }

    /// Declares a foreign key.
    #[must_use]
    pub fn foreign_key(
        mut self,
        field: &'static str,
        get: fn(&R) -> Option<RowId>,
        references: &'static str,
        on_delete: DeletePolicy,
    ) -> Self {
        self.foreign_keys.push(ForeignKey { field, get, references, on_delete });
        self
    }

    /// Declares a field constraint.
    #[must_use]
    pub fn constraint(mut self, constraint: FieldConstraint<R>) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Declared unique indexes.
    pub(crate) fn unique_indexes(&self) -> &[UniqueIndex<R>] {
        &self.unique_indexes
    }

    /// Declared foreign keys.
    pub(crate) fn foreign_keys(&self) -> &[ForeignKey<R>] {
        &self.foreign_keys
    }

    /// Declared field constraints.
    pub(crate) fn constraints(&self) -> &[FieldConstraint<R>] {
        &self.constraints
    }
}

impl<R: Row> Default for TableSpec<R> {
    fn default() -> Self {
        Self::new()
    }
}
