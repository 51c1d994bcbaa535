//! The generic table store: one instance per row type, sole owner of
//! that table's rows and backing file.
//!
//! # Concurrency
//!
//! Every operation guards the in-memory collection with a per-table
//! reentrant lock acquired with a bounded timeout. Mutations hold the
//! lock for their full duration, including the file write; reads take
//! it briefly and return a point-in-time snapshot. A timeout is
//! reported as [`Error::LockTimeout`](crate::error::Error::LockTimeout) — deadlock is a programming
//! defect, not a recoverable condition.
//!
//! Triggers and foreign-key checks may call into *other* tables while
//! the originating table is locked, and may legally re-enter the
//! originating table on the same thread (the lock is reentrant).
//! Across threads, cross-table edges must stay acyclic: if table A's
//! triggers or keys reach table B, table B's must not reach A.
//!
//! Interior state sits in a `RefCell` under the reentrant lock; borrows
//! are scoped to single steps and never held across hook or
//! cross-table calls.

use std::{
    cell::RefCell,
    collections::HashMap,
    sync::{Arc, Weak},
    time::Duration,
};

use parking_lot::{ReentrantMutex, ReentrantMutexGuard};
use simpledb_types::{Row, RowId};

use crate::{
    db::{StoreShared, Stores},
    error::{
        ClosedSnafu, CorruptedSnafu, InvalidFieldSnafu, LockTimeoutSnafu, Result,
        RowNotFoundSnafu, StillReferencedSnafu, UniqueIndexSnafu, UnresolvedReferenceSnafu,
    },
    file::TableFile,
    hooks::LifecycleHooks,
    schema::{DeletePolicy, TableSpec},
};

/// In-memory state of one table.
struct TableState<R> {
    /// All rows, in insertion order.
    rows: Vec<R>,
    /// Identity index: row id → position in `rows`.
    by_id: HashMap<RowId, usize>,
    /// Next id the primary sequence will allocate.
    sequence: RowId,
}

impl<R: Row> TableState<R> {
    fn position(&self, id: RowId) -> Option<usize> {
        self.by_id.get(&id).copied()
    }

    /// Rebuilds `by_id` positions from `from` onward after a removal or
    /// insertion shifted the tail of `rows`.
    fn reindex(&mut self, from: usize) {
        for idx in from..self.rows.len() {
            self.by_id.insert(self.rows[idx].id(), idx);
        }
    }
}

/// Generic CRUD engine for one row type.
///
/// Constructed by the [`DatabaseBuilder`](crate::DatabaseBuilder) at
/// bootstrap; domain code obtains a handle through
/// [`Database::table`](crate::Database::table) or
/// [`Stores::table`] and uses only the operations here.
pub struct TableStore<R: Row> {
    shared: Weak<StoreShared>,
    spec: TableSpec<R>,
    hooks: Arc<dyn LifecycleHooks<R>>,
    file: TableFile,
    lock_timeout: Duration,
    state: ReentrantMutex<RefCell<TableState<R>>>,
}

impl<R: Row> std::fmt::Debug for TableStore<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableStore")
            .field("table", &R::TABLE)
            .finish_non_exhaustive()
    }
}

impl<R: Row> TableStore<R> {
    /// Opens the table: loads its backing file (or starts empty) and
    /// seeds the primary sequence.
    pub(crate) fn open(
        shared: &Arc<StoreShared>,
        spec: TableSpec<R>,
        hooks: Arc<dyn LifecycleHooks<R>>,
    ) -> Result<Self> {
        let config = &shared.config;
        let file = TableFile::new(
            &shared.root,
            R::TABLE,
            &config.file_extension,
            config.sync_on_write,
        );

        let origin = spec.sequence_origin;
        let (rows, persisted_sequence) = match file.load::<R>()? {
            Some((rows, sequence)) => (rows, sequence),
            None => (Vec::new(), origin),
        };

        let mut by_id = HashMap::with_capacity(rows.len());
        for (idx, row) in rows.iter().enumerate() {
            if by_id.insert(row.id(), idx).is_some() {
                return CorruptedSnafu {
                    path: file.path().to_path_buf(),
                    reason: format!("duplicate id {} in table {}", row.id(), R::TABLE),
                }
                .fail();
            }
        }

        let sequence = seed_sequence(origin, persisted_sequence, &rows);

        Ok(Self {
            shared: Arc::downgrade(shared),
            spec,
            hooks,
            file,
            lock_timeout: config.lock_timeout(),
            state: ReentrantMutex::new(RefCell::new(TableState { rows, by_id, sequence })),
        })
    }

    /// The table's name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        R::TABLE
    }

    /// The table's schema declarations.
    pub(crate) fn spec(&self) -> &TableSpec<R> {
        &self.spec
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Returns all rows in insertion order (a point-in-time snapshot).
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockTimeout`](crate::error::Error::LockTimeout) if the table lock cannot be
    /// acquired in time.
    pub fn select_all(&self) -> Result<Vec<R>> {
        let guard = self.lock()?;
        let rows = guard.borrow().rows.clone();
        Ok(rows)
    }

    /// Returns the row with the given id, or `None`.
    ///
    /// Absence is not an error: a missing identity is an ordinary
    /// outcome for callers probing the table.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockTimeout`](crate::error::Error::LockTimeout) if the table lock cannot be
    /// acquired in time.
    pub fn select(&self, id: RowId) -> Result<Option<R>> {
        let guard = self.lock()?;
        let state = guard.borrow();
        Ok(state.position(id).map(|idx| state.rows[idx].clone()))
    }

    /// Returns all rows matching the predicate, in insertion order.
    ///
    /// The predicate is re-evaluated on each call against the current
    /// state; the returned snapshot has no further side effects.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockTimeout`](crate::error::Error::LockTimeout) if the table lock cannot be
    /// acquired in time.
    pub fn select_where<F>(&self, predicate: F) -> Result<Vec<R>>
    where
        F: Fn(&R) -> bool,
    {
        let guard = self.lock()?;
        let state = guard.borrow();
        Ok(state.rows.iter().filter(|row| predicate(row)).cloned().collect())
    }

    /// Number of rows currently in the table.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockTimeout`](crate::error::Error::LockTimeout) if the table lock cannot be
    /// acquired in time.
    pub fn record_count(&self) -> Result<usize> {
        let guard = self.lock()?;
        let count = guard.borrow().rows.len();
        Ok(count)
    }

    /// Next id the primary sequence will allocate.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockTimeout`](crate::error::Error::LockTimeout) if the table lock cannot be
    /// acquired in time.
    pub fn primary_sequence(&self) -> Result<RowId> {
        let guard = self.lock()?;
        let sequence = guard.borrow().sequence;
        Ok(sequence)
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Inserts a row and returns it in its persisted form.
    ///
    /// A transient row receives the next primary-sequence value; a row
    /// with an explicit id keeps it. Defaults are applied, then field
    /// constraints, unique indexes, and foreign keys are validated,
    /// insert triggers fire, and the backing file is rewritten. On any
    /// failure nothing is retained: the row is neither in memory nor on
    /// disk when this returns an error (an allocated sequence value may
    /// be skipped; ids are never reused).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidField`](crate::error::Error::InvalidField), [`Error::UniqueIndex`](crate::error::Error::UniqueIndex),
    /// [`Error::UnresolvedReference`](crate::error::Error::UnresolvedReference), or [`Error::Vetoed`](crate::error::Error::Vetoed) on
    /// validation and trigger failures; [`Error::Io`](crate::error::Error::Io)/[`Error::Codec`](crate::error::Error::Codec)
    /// if persisting fails; [`Error::LockTimeout`](crate::error::Error::LockTimeout) on lock timeout.
    pub fn insert(&self, row: R) -> Result<R> {
        let stores = self.stores()?;
        let guard = self.lock()?;
        self.insert_under_lock(&guard, &stores, row)
    }

    /// Inserts rows in order, committing each independently.
    ///
    /// The first failure aborts the remaining rows and is returned;
    /// rows committed earlier in the batch stay committed. Matches
    /// bulk-seed usage where partial success is acceptable.
    ///
    /// # Errors
    ///
    /// Same conditions as [`insert`](Self::insert), for the first row
    /// that fails.
    pub fn insert_many<I>(&self, rows: I) -> Result<Vec<R>>
    where
        I: IntoIterator<Item = R>,
    {
        let stores = self.stores()?;
        let guard = self.lock()?;
        let mut inserted = Vec::new();
        for row in rows {
            inserted.push(self.insert_under_lock(&guard, &stores, row)?);
        }
        Ok(inserted)
    }

    /// Updates a persisted row in place.
    ///
    /// Re-validates constraints, unique indexes (excluding the row's
    /// own previous values), and foreign keys; fires update triggers;
    /// rewrites the backing file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RowNotFound`](crate::error::Error::RowNotFound) if no row with this id exists;
    /// otherwise the same conditions as [`insert`](Self::insert).
    pub fn update(&self, row: R) -> Result<R> {
        let stores = self.stores()?;
        let guard = self.lock()?;

        let exists = guard.borrow().position(row.id()).is_some();
        if !exists {
            return RowNotFoundSnafu { table: R::TABLE, id: row.id() }.fail();
        }

        for constraint in self.spec.constraints() {
            constraint.check(&row).map_err(|err| {
                InvalidFieldSnafu { table: R::TABLE, field: err.field, rule: err.constraint }
                    .build()
            })?;
        }
        {
            let state = guard.borrow();
            self.check_unique(&state, &row, Some(row.id()))?;
        }
        self.check_foreign_keys(&stores, &row)?;
        self.hooks.on_update(&stores, &row)?;

        // Triggers may have re-entered this table; resolve the position
        // only now.
        let position = guard.borrow().position(row.id());
        let idx =
            position.ok_or_else(|| RowNotFoundSnafu { table: R::TABLE, id: row.id() }.build())?;
        let previous = {
            let mut state = guard.borrow_mut();
            std::mem::replace(&mut state.rows[idx], row.clone())
        };

        let written = {
            let state = guard.borrow();
            self.file.rewrite(state.sequence, &state.rows)
        };
        if let Err(err) = written {
            tracing::warn!(table = R::TABLE, %err, "update not persisted; restoring row");
            guard.borrow_mut().rows[idx] = previous;
            return Err(err);
        }
        Ok(row)
    }

    /// Deletes a persisted row.
    ///
    /// Delete triggers fire first and may veto; then block-policy
    /// dependents fail the delete; then cascade-policy dependents are
    /// deleted through their own delete path; finally the row is
    /// removed and the backing file rewritten.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RowNotFound`](crate::error::Error::RowNotFound) if no row with this id exists,
    /// [`Error::Vetoed`](crate::error::Error::Vetoed) if a trigger blocks the delete,
    /// [`Error::StillReferenced`](crate::error::Error::StillReferenced) if a block-policy dependent remains,
    /// and [`Error::Io`](crate::error::Error::Io)/[`Error::Codec`](crate::error::Error::Codec)/[`Error::LockTimeout`](crate::error::Error::LockTimeout) as in
    /// the other mutations.
    pub fn delete(&self, row: &R) -> Result<()> {
        self.delete_id(row.id())
    }

    /// Deletes by id; see [`delete`](Self::delete).
    ///
    /// # Errors
    ///
    /// Same conditions as [`delete`](Self::delete).
    pub fn delete_id(&self, id: RowId) -> Result<()> {
        let stores = self.stores()?;
        let guard = self.lock()?;

        let row = {
            let state = guard.borrow();
            state.position(id).map(|idx| state.rows[idx].clone())
        }
        .ok_or_else(|| RowNotFoundSnafu { table: R::TABLE, id }.build())?;

        self.hooks.on_delete(&stores, &row)?;

        let shared = self.shared.upgrade().ok_or_else(|| ClosedSnafu.build())?;
        let bindings = shared.foreign_keys.read().referencing(R::TABLE);

        for binding in bindings.iter().filter(|b| b.on_delete == DeletePolicy::Block) {
            let dependent = stores.erased(binding.dependent_table)?;
            if dependent.has_reference(binding.field, id)? {
                return StillReferencedSnafu {
                    table: R::TABLE,
                    id,
                    dependent: binding.dependent_table,
                    field: binding.field,
                }
                .fail();
            }
        }
        for binding in bindings.iter().filter(|b| b.on_delete == DeletePolicy::Cascade) {
            let dependent = stores.erased(binding.dependent_table)?;
            dependent.delete_referencing(binding.field, id)?;
        }

        let (removed, idx) = {
            let mut state = guard.borrow_mut();
            let idx = state
                .by_id
                .remove(&id)
                .ok_or_else(|| RowNotFoundSnafu { table: R::TABLE, id }.build())?;
            let removed = state.rows.remove(idx);
            state.reindex(idx);
            (removed, idx)
        };

        let written = {
            let state = guard.borrow();
            self.file.rewrite(state.sequence, &state.rows)
        };
        if let Err(err) = written {
            tracing::warn!(table = R::TABLE, %err, "delete not persisted; restoring row");
            let mut state = guard.borrow_mut();
            state.rows.insert(idx, removed);
            state.reindex(idx);
            return Err(err);
        }
        Ok(())
    }

    /// Removes all rows and resets the file to empty.
    ///
    /// The primary sequence is deliberately *not* reset: identifiers
    /// already handed out are never reused by future inserts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`](crate::error::Error::Io)/[`Error::Codec`](crate::error::Error::Codec) if the empty file cannot
    /// be written (rows are restored), [`Error::LockTimeout`](crate::error::Error::LockTimeout) on lock
    /// timeout.
    pub fn truncate(&self) -> Result<()> {
        let guard = self.lock()?;

        let (previous_rows, previous_index) = {
            let mut state = guard.borrow_mut();
            (std::mem::take(&mut state.rows), std::mem::take(&mut state.by_id))
        };

        let written = {
            let state = guard.borrow();
            self.file.rewrite(state.sequence, &state.rows)
        };
        if let Err(err) = written {
            tracing::warn!(table = R::TABLE, %err, "truncate not persisted; restoring rows");
            let mut state = guard.borrow_mut();
            state.rows = previous_rows;
            state.by_id = previous_index;
            return Err(err);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Bootstrap support
    // ------------------------------------------------------------------

    /// Inserts the hook-provided seed catalog when the table is empty.
    pub(crate) fn seed_if_empty(&self, stores: &Stores) -> Result<()> {
        if self.record_count()? > 0 {
            return Ok(());
        }
        let seeds = self.hooks.seed_rows();
        if seeds.is_empty() {
            return Ok(());
        }

        tracing::debug!(table = R::TABLE, rows = seeds.len(), "seeding empty table");
        let guard = self.lock()?;
        for row in seeds {
            self.insert_under_lock(&guard, stores, row)?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn lock(&self) -> Result<ReentrantMutexGuard<'_, RefCell<TableState<R>>>> {
        self.state.try_lock_for(self.lock_timeout).ok_or_else(|| {
            let timeout_ms = self.lock_timeout.as_millis() as u64;
            tracing::error!(
                table = R::TABLE,
                timeout_ms,
                "table lock acquisition timed out; cross-table order is likely cyclic"
            );
            LockTimeoutSnafu { table: R::TABLE, timeout_ms }.build()
        })
    }

    fn stores(&self) -> Result<Stores> {
        self.shared.upgrade().map(Stores::new).ok_or_else(|| ClosedSnafu.build())
    }

    fn insert_under_lock(
        &self,
        guard: &ReentrantMutexGuard<'_, RefCell<TableState<R>>>,
        stores: &Stores,
        mut row: R,
    ) -> Result<R> {
        let sequence_before;
        let sequence_after;
        {
            let mut state = guard.borrow_mut();
            sequence_before = state.sequence;
            if row.is_transient() {
                row.set_id(state.sequence);
                state.sequence += 1;
            } else {
                if state.by_id.contains_key(&row.id()) {
                    return UniqueIndexSnafu {
                        table: R::TABLE,
                        index: "id",
                        value: row.id().to_string(),
                    }
                    .fail();
                }
                // An explicit id in the locally minted namespace must
                // not be handed out again by the sequence.
                if in_local_namespace(self.spec.sequence_origin, row.id())
                    && row.id() >= state.sequence
                {
                    state.sequence = row.id() + 1;
                }
            }
            sequence_after = state.sequence;
        }

        self.hooks.apply_defaults(&mut row);

        if let Err(err) = self.validate_row(guard, stores, &row) {
            // Validation runs no hooks, so nothing else can have moved
            // the sequence; hand the allocation back untouched.
            guard.borrow_mut().sequence = sequence_before;
            return Err(err);
        }

        // The row becomes visible before insert triggers run so that
        // dependent rows created by a trigger can resolve their foreign
        // key back to it. A trigger failure removes it again below; the
        // file has not been written at that point.
        {
            let mut state = guard.borrow_mut();
            let idx = state.rows.len();
            state.rows.push(row.clone());
            state.by_id.insert(row.id(), idx);
        }

        if let Err(err) = self.hooks.on_insert(stores, &row) {
            self.discard_unpersisted(guard, row.id(), sequence_before, sequence_after);
            return Err(err);
        }

        let written = {
            let state = guard.borrow();
            self.file.rewrite(state.sequence, &state.rows)
        };
        if let Err(err) = written {
            tracing::warn!(table = R::TABLE, %err, "insert not persisted; discarding row");
            self.discard_unpersisted(guard, row.id(), sequence_before, sequence_after);
            return Err(err);
        }
        Ok(row)
    }

    /// Field constraints, unique indexes, and foreign keys for one
    /// candidate row.
    fn validate_row(
        &self,
        guard: &ReentrantMutexGuard<'_, RefCell<TableState<R>>>,
        stores: &Stores,
        row: &R,
    ) -> Result<()> {
        for constraint in self.spec.constraints() {
            constraint.check(row).map_err(|err| {
                InvalidFieldSnafu { table: R::TABLE, field: err.field, rule: err.constraint }
                    .build()
            })?;
        }
        {
            let state = guard.borrow();
            self.check_unique(&state, row, None)?;
        }
        self.check_foreign_keys(stores, row)
    }

    /// Removes a provisionally inserted row again and, when a nested
    /// operation already rewrote the file with it included, rewrites
    /// the file without it. The sequence move made for this insert is
    /// undone unless a nested insert advanced the sequence further.
    fn discard_unpersisted(
        &self,
        guard: &ReentrantMutexGuard<'_, RefCell<TableState<R>>>,
        id: RowId,
        sequence_before: RowId,
        sequence_after: RowId,
    ) {
        {
            let mut state = guard.borrow_mut();
            if let Some(idx) = state.by_id.remove(&id) {
                state.rows.remove(idx);
                state.reindex(idx);
            }
            if state.sequence == sequence_after {
                state.sequence = sequence_before;
            }
        }
        let state = guard.borrow();
        if let Err(err) = self.file.rewrite(state.sequence, &state.rows) {
            tracing::warn!(table = R::TABLE, %err, "rollback rewrite failed");
        }
    }

    fn check_unique(
        &self,
        state: &TableState<R>,
        candidate: &R,
        exclude: Option<RowId>,
    ) -> Result<()> {
        for index in self.spec.unique_indexes() {
            let key = (index.key)(candidate);
            for existing in &state.rows {
                if Some(existing.id()) == exclude {
                    continue;
                }
                if (index.key)(existing) == key {
                    return UniqueIndexSnafu { table: R::TABLE, index: index.name, value: key }
                        .fail();
                }
            }
        }
        Ok(())
    }

    fn check_foreign_keys(&self, stores: &Stores, row: &R) -> Result<()> {
        for fk in self.spec.foreign_keys() {
            if let Some(target) = (fk.get)(row) {
                let referenced = stores.erased(fk.references)?;
                if !referenced.contains(target)? {
                    return UnresolvedReferenceSnafu {
                        table: R::TABLE,
                        field: fk.field,
                        id: target,
                        references: fk.references,
                    }
                    .fail();
                }
            }
        }
        Ok(())
    }
}

/// Type-erased view of a table store, used by the foreign-key path so a
/// referenced table can interrogate its dependents without knowing
/// their row types.
pub(crate) trait ErasedTable: Send + Sync {
    /// Whether a row with this id exists.
    fn contains(&self, id: RowId) -> Result<bool>;

    /// Whether any row's foreign-key `field` currently references `id`.
    fn has_reference(&self, field: &'static str, id: RowId) -> Result<bool>;

    /// Deletes every row whose foreign-key `field` references `id`,
    /// through the full delete path. Returns the number deleted.
    fn delete_referencing(&self, field: &'static str, id: RowId) -> Result<usize>;
}

impl<R: Row> ErasedTable for TableStore<R> {
    fn contains(&self, id: RowId) -> Result<bool> {
        let guard = self.lock()?;
        let found = guard.borrow().by_id.contains_key(&id);
        Ok(found)
    }

    fn has_reference(&self, field: &'static str, id: RowId) -> Result<bool> {
        let Some(fk) = self.spec.foreign_keys().iter().find(|fk| fk.field == field) else {
            return Ok(false);
        };
        let get = fk.get;
        let guard = self.lock()?;
        let found = guard.borrow().rows.iter().any(|row| get(row) == Some(id));
        Ok(found)
    }

    fn delete_referencing(&self, field: &'static str, id: RowId) -> Result<usize> {
        let Some(fk) = self.spec.foreign_keys().iter().find(|fk| fk.field == field) else {
            return Ok(0);
        };
        let get = fk.get;
        let victims: Vec<RowId> = {
            let guard = self.lock()?;
            let state = guard.borrow();
            state
                .rows
                .iter()
                .filter(|row| get(row) == Some(id))
                .map(Row::id)
                .collect()
        };
        for victim in &victims {
            self.delete_id(*victim)?;
        }
        Ok(victims.len())
    }
}

/// Seeds the in-memory sequence after a load.
///
/// The persisted header value wins, but never drops below the origin or
/// below one past the highest id in the locally minted namespace (so a
/// hand-edited or legacy file cannot make the sequence re-issue ids).
fn seed_sequence<R: Row>(origin: RowId, persisted: RowId, rows: &[R]) -> RowId {
    let observed = rows
        .iter()
        .map(Row::id)
        .filter(|&id| in_local_namespace(origin, id))
        .max()
        .map(|max| max.saturating_add(1))
        .unwrap_or(origin);
    persisted.max(origin).max(observed)
}

/// Whether an id belongs to the table's locally minted namespace.
///
/// Tables with a negative origin mint ids in `[origin, 0)`, leaving the
/// nonnegative space to the external identity source; tables with a
/// nonnegative origin own everything from the origin up.
fn in_local_namespace(origin: RowId, id: RowId) -> bool {
    if origin < 0 {
        id >= origin && id < 0
    } else {
        id >= origin
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use serde::{Deserialize, Serialize};
    use simpledb_types::TRANSIENT_ROW_ID;

    use super::*;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Plain {
        id: RowId,
    }

    impl Row for Plain {
        const TABLE: &'static str = "plain";

        fn id(&self) -> RowId {
            self.id
        }

        fn set_id(&mut self, id: RowId) {
            self.id = id;
        }
    }

    fn rows(ids: &[RowId]) -> Vec<Plain> {
        ids.iter().map(|&id| Plain { id }).collect()
    }

    #[test]
    fn test_local_namespace_nonnegative_origin() {
        assert!(in_local_namespace(0, 0));
        assert!(in_local_namespace(0, 42));
        assert!(!in_local_namespace(0, -5));
        assert!(!in_local_namespace(0, TRANSIENT_ROW_ID));
    }

    #[test]
    fn test_local_namespace_min_origin() {
        assert!(in_local_namespace(RowId::MIN, RowId::MIN));
        assert!(in_local_namespace(RowId::MIN, -2));
        assert!(!in_local_namespace(RowId::MIN, 0));
        assert!(!in_local_namespace(RowId::MIN, 42));
    }

    #[test]
    fn test_seed_sequence_prefers_persisted_value() {
        assert_eq!(seed_sequence(0, 10, &rows(&[0, 1, 2])), 10);
    }

    #[test]
    fn test_seed_sequence_recovers_from_stale_header() {
        assert_eq!(seed_sequence(0, 1, &rows(&[0, 1, 2])), 3);
    }

    #[test]
    fn test_seed_sequence_empty_table_uses_origin() {
        assert_eq!(seed_sequence(0, 0, &rows(&[])), 0);
        assert_eq!(seed_sequence(RowId::MIN, RowId::MIN, &rows(&[])), RowId::MIN);
    }

    #[test]
    fn test_seed_sequence_ignores_external_ids() {
        // External nonnegative ids must not drag the local sequence out
        // of the negative namespace.
        let table = rows(&[RowId::MIN, RowId::MIN + 1, 42, 7000]);
        assert_eq!(seed_sequence(RowId::MIN, RowId::MIN + 2, &table), RowId::MIN + 2);
    }
}
