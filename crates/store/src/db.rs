//! Database bootstrap and the shared table registry.
//!
//! A [`Database`] is the single process-wide entry point: one
//! initialization call receives the storage root and the complete set
//! of table registrations (spec + hooks per row type), loads every
//! backing file, wires foreign keys into the shared
//! [`ForeignKeyManager`], runs seed catalogs, and returns once every
//! table is ready to serve.
//!
//! Table stores are exposed through a shared registry resolved lazily
//! by row type ([`Stores::table`]), so a trigger registered early can
//! reach a table registered later — bootstrap order only matters for
//! seed execution, which runs in registration order after all tables
//! are loaded.
//!
//! # Example
//!
//! ```no_run
//! use simpledb_store::{Database, TableSpec};
//! # use serde::{Deserialize, Serialize};
//! # use simpledb_store::{Row, RowId};
//! # #[derive(Debug, Clone, Serialize, Deserialize)]
//! # struct Category { id: RowId, name: String }
//! # impl Row for Category {
//! #     const TABLE: &'static str = "categories";
//! #     fn id(&self) -> RowId { self.id }
//! #     fn set_id(&mut self, id: RowId) { self.id = id; }
//! # }
//!
//! let db = Database::builder("/var/lib/app/data")
//!     .register::<Category>(TableSpec::new().unique("name", |c: &Category| c.name.clone()))
//!     .open()?;
//!
//! let categories = db.table::<Category>()?;
//! let row = categories.insert(Category { id: -1, name: "books".to_string() })?;
//! # Ok::<(), simpledb_store::Error>(())
//! ```

use std::{
    any::{Any, TypeId},
    collections::HashMap,
    fs,
    path::PathBuf,
    sync::Arc,
};

use parking_lot::RwLock;
use simpledb_types::{Row, StoreConfig};
use snafu::ResultExt;

use crate::{
    error::{AlreadyRegisteredSnafu, IoSnafu, Result, UnknownTableSnafu},
    fkeys::{ForeignKeyBinding, ForeignKeyManager},
    hooks::{LifecycleHooks, NoHooks},
    schema::TableSpec,
    table::{ErasedTable, TableStore},
};

/// State shared by the database handle and every table store.
pub(crate) struct StoreShared {
    pub(crate) root: PathBuf,
    pub(crate) config: StoreConfig,
    /// Typed registry: row type → `Arc<TableStore<R>>`.
    by_type: RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
    /// Erased registry: table name → type-erased store, for the
    /// foreign-key path.
    by_name: RwLock<HashMap<&'static str, Arc<dyn ErasedTable>>>,
    pub(crate) foreign_keys: RwLock<ForeignKeyManager>,
}

/// Lazy, shared view of all registered table stores.
///
/// Handed to lifecycle triggers so cross-table cascades can resolve
/// their target tables by row type without compile-time coupling.
#[derive(Clone)]
pub struct Stores {
    shared: Arc<StoreShared>,
}

impl Stores {
    pub(crate) fn new(shared: Arc<StoreShared>) -> Self {
        Self { shared }
    }

    /// Resolves the table store for a row type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownTable`](crate::error::Error::UnknownTable) if the row type was never
    /// registered.
    pub fn table<R: Row>(&self) -> Result<Arc<TableStore<R>>> {
        let registry = self.shared.by_type.read();
        registry
            .get(&TypeId::of::<R>())
            .cloned()
            .and_then(|any| any.downcast::<TableStore<R>>().ok())
            .ok_or_else(|| UnknownTableSnafu { table: R::TABLE }.build())
    }

    /// Resolves a table store by name, type-erased.
    pub(crate) fn erased(&self, table: &str) -> Result<Arc<dyn ErasedTable>> {
        let registry = self.shared.by_name.read();
        registry
            .get(table)
            .cloned()
            .ok_or_else(|| UnknownTableSnafu { table }.build())
    }
}

/// The open database: owner of the persistence root and the registry of
/// table stores.
pub struct Database {
    shared: Arc<StoreShared>,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("root", &self.shared.root)
            .finish_non_exhaustive()
    }
}

impl Database {
    /// Starts building a database rooted at `root`.
    pub fn builder(root: impl Into<PathBuf>) -> DatabaseBuilder {
        DatabaseBuilder {
            root: root.into(),
            config: StoreConfig::default(),
            registrations: Vec::new(),
        }
    }

    /// Resolves the table store for a row type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownTable`](crate::error::Error::UnknownTable) if the row type was never
    /// registered.
    pub fn table<R: Row>(&self) -> Result<Arc<TableStore<R>>> {
        self.stores().table::<R>()
    }

    /// The shared registry view, as triggers receive it.
    #[must_use]
    pub fn stores(&self) -> Stores {
        Stores::new(Arc::clone(&self.shared))
    }

    /// Number of registered foreign-key relationships.
    #[must_use]
    pub fn foreign_key_count(&self) -> usize {
        self.shared.foreign_keys.read().len()
    }
}

type Registration = Box<dyn FnOnce(&Arc<StoreShared>) -> Result<SeedTask>>;
type SeedTask = Box<dyn FnOnce(&Stores) -> Result<()>>;

/// Collects table registrations, then opens the database in one call.
pub struct DatabaseBuilder {
    root: PathBuf,
    config: StoreConfig,
    registrations: Vec<Registration>,
}

impl DatabaseBuilder {
    /// Replaces the default configuration.
    #[must_use]
    pub fn config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    /// Registers a plain CRUD table (no hooks).
    #[must_use]
    pub fn register<R: Row>(self, spec: TableSpec<R>) -> Self {
        self.register_with_hooks(spec, NoHooks)
    }

    /// Registers a table with lifecycle hooks.
    #[must_use]
    pub fn register_with_hooks<R, H>(mut self, spec: TableSpec<R>, hooks: H) -> Self
    where
        R: Row,
        H: LifecycleHooks<R>,
    {
        let hooks: Arc<dyn LifecycleHooks<R>> = Arc::new(hooks);
        self.registrations.push(Box::new(move |shared| {
            let store = Arc::new(TableStore::<R>::open(shared, spec, hooks)?);

            {
                let mut by_name = shared.by_name.write();
                if by_name.contains_key(R::TABLE) {
                    return AlreadyRegisteredSnafu { table: R::TABLE }.fail();
                }
                by_name.insert(R::TABLE, Arc::clone(&store) as Arc<dyn ErasedTable>);
            }
            shared
                .by_type
                .write()
                .insert(TypeId::of::<R>(), Arc::clone(&store) as Arc<dyn Any + Send + Sync>);

            {
                let mut manager = shared.foreign_keys.write();
                for fk in spec_foreign_keys(&store) {
                    manager.register(fk);
                }
            }

            let seed: SeedTask = Box::new(move |stores| store.seed_if_empty(stores));
            Ok(seed)
        }));
        self
    }

    /// Opens the database: creates the root directory, loads every
    /// registered table, wires foreign keys, and runs seed catalogs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`](crate::error::Error::Io) if the root cannot be created or a file
    /// cannot be read, [`Error::Corrupted`](crate::error::Error::Corrupted)/[`Error::Codec`](crate::error::Error::Codec) for
    /// malformed files, [`Error::AlreadyRegistered`](crate::error::Error::AlreadyRegistered) for duplicate
    /// table names, and any engine error raised while seeding.
    pub fn open(self) -> Result<Database> {
        fs::create_dir_all(&self.root).context(IoSnafu { path: self.root.clone() })?;

        let shared = Arc::new(StoreShared {
            root: self.root,
            config: self.config,
            by_type: RwLock::new(HashMap::new()),
            by_name: RwLock::new(HashMap::new()),
            foreign_keys: RwLock::new(ForeignKeyManager::default()),
        });

        let mut seeds = Vec::with_capacity(self.registrations.len());
        for registration in self.registrations {
            seeds.push(registration(&shared)?);
        }

        let database = Database { shared };
        let stores = database.stores();
        for seed in seeds {
            seed(&stores)?;
        }

        tracing::debug!(
            root = %database.shared.root.display(),
            tables = database.shared.by_name.read().len(),
            foreign_keys = database.shared.foreign_keys.read().len(),
            "database open"
        );
        Ok(database)
    }
}

/// Projects the erased foreign-key bindings out of a typed store.
fn spec_foreign_keys<R: Row>(store: &TableStore<R>) -> Vec<ForeignKeyBinding> {
    store
        .spec()
        .foreign_keys()
        .iter()
        .map(|fk| ForeignKeyBinding {
            dependent_table: R::TABLE,
            field: fk.field,
            references: fk.references,
            on_delete: fk.on_delete,
        })
        .collect()
}
