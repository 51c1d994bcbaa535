//! Per-row-type lifecycle hooks.
//!
//! Cross-table behavior ("creating a product creates its stock record",
//! "a product with stock on hand cannot be deleted") is never
//! hard-coded into the generic engine. It is supplied per row type
//! through this trait and registered exactly once at bootstrap, so the
//! engine stays generic and the business rule lives with its domain.
//!
//! Registration is an explicit table (row type → hook implementation)
//! built by the [`DatabaseBuilder`](crate::DatabaseBuilder); there is
//! no runtime type scanning. A row type registered without hooks
//! behaves as a plain CRUD table.

use simpledb_types::Row;

use crate::{db::Stores, error::Result};

/// Defaults and triggers for one row type.
///
/// All methods have no-op provided implementations; implementors
/// override only what their domain needs.
///
/// Triggers receive [`Stores`] and may read or mutate *other* tables;
/// those operations take the other tables' locks. Cross-table trigger
/// ordering must be acyclic across threads (see the concurrency notes
/// on [`TableStore`](crate::TableStore)). A trigger vetoes its
/// mutation by returning [`Error::Vetoed`](crate::Error::Vetoed).
pub trait LifecycleHooks<R: Row>: Send + Sync + 'static {
    /// Populates computed or derived fields on a new row before its
    /// first insert.
    fn apply_defaults(&self, _row: &mut R) {}

    /// Fixed catalog inserted when the table is empty at bootstrap.
    fn seed_rows(&self) -> Vec<R> {
        Vec::new()
    }

    /// Runs after the row is visible in its table, before it is
    /// persisted. Failure aborts the insert.
    fn on_insert(&self, _stores: &Stores, _row: &R) -> Result<()> {
        Ok(())
    }

    /// Runs before an update is persisted. Failure aborts the update.
    fn on_update(&self, _stores: &Stores, _row: &R) -> Result<()> {
        Ok(())
    }

    /// Runs before any delete work happens. Failure aborts the delete
    /// with no mutation anywhere.
    fn on_delete(&self, _stores: &Stores, _row: &R) -> Result<()> {
        Ok(())
    }
}

/// Hooks for a plain CRUD table: no defaults, no seeds, no triggers.
pub struct NoHooks;

impl<R: Row> LifecycleHooks<R> for NoHooks {}
