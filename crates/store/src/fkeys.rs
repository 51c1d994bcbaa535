//! Foreign-key registry.
//!
//! Holds every `(dependent table, dependent field) → referenced table`
//! declaration, collected from table specs at bootstrap. The registry
//! answers the delete-time question — "who still references this id,
//! and under which policy?" — without the referenced table needing
//! compile-time knowledge of its dependents. Insert/update-time
//! resolution runs on the typed side, straight from the mutating
//! table's own spec.

use crate::schema::DeletePolicy;

/// One registered foreign-key relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKeyBinding {
    /// Table holding the foreign-key field.
    pub dependent_table: &'static str,
    /// The foreign-key field.
    pub field: &'static str,
    /// Table the field resolves into.
    pub references: &'static str,
    /// Policy applied when the referenced row is deleted.
    pub on_delete: DeletePolicy,
}

/// Registry of all foreign-key declarations across all tables.
#[derive(Debug, Default)]
pub struct ForeignKeyManager {
    bindings: Vec<ForeignKeyBinding>,
}

impl ForeignKeyManager {
    pub(crate) fn register(&mut self, binding: ForeignKeyBinding) {
        self.bindings.push(binding);
    }

    /// All bindings whose referenced table is `table`, i.e. the
    /// relationships to consult before deleting one of its rows.
    pub(crate) fn referencing(&self, table: &str) -> Vec<ForeignKeyBinding> {
        self.bindings.iter().filter(|b| b.references == table).copied().collect()
    }

    /// Number of registered bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// True when no foreign keys are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
