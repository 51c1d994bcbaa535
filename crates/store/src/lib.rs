//! simpledb-store: a generic, file-persisted table engine.
//!
//! Every table is a typed, in-memory collection of rows backed 1:1 by
//! one persisted file, with light relational guard rails layered on
//! top:
//!
//! - **Typed CRUD**: select / insert / update / delete / truncate per
//!   row type, with primary-key sequencing
//! - **Unique indexes**: declared field projections that must stay
//!   distinct across the table
//! - **Foreign keys**: declared references into other tables with
//!   block- or cascade-on-delete policies
//! - **Lifecycle hooks**: per-row-type defaults, seed catalogs, and
//!   insert/update/delete triggers for cross-table rules
//! - **Crash-safe persistence**: whole-file write-new-then-replace on
//!   every committed mutation
//!
//! It is not a relational database: no query language, no joins, no
//! cross-table transactions. One process, one machine, one lock per
//! table.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 Database                     │
//! │   (bootstrap, shared registry, seeding)     │
//! └────────┬───────────────────┬────────────────┘
//!          │                   │
//! ┌────────▼────────┐ ┌────────▼────────────────┐
//! │ LifecycleHooks  │ │   ForeignKeyManager      │
//! │ (defaults,      │ │ (cross-table reference   │
//! │  triggers)      │ │  registry)               │
//! └────────┬────────┘ └────────┬────────────────┘
//!          │                   │
//! ┌────────▼───────────────────▼────────────────┐
//! │            TableStore<R> (per table)         │
//! │  (CRUD, sequence, unique indexes, lock)     │
//! └────────────────────┬────────────────────────┘
//!                      │
//! ┌────────────────────▼────────────────────────┐
//! │              TableFile (per table)           │
//! │   (JSON-lines records, atomic replace)      │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Quick start
//!
//! ```no_run
//! use serde::{Deserialize, Serialize};
//! use simpledb_store::{Database, Row, RowId, TableSpec, TRANSIENT_ROW_ID};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize)]
//! struct Category {
//!     id: RowId,
//!     name: String,
//! }
//!
//! impl Row for Category {
//!     const TABLE: &'static str = "categories";
//!     fn id(&self) -> RowId {
//!         self.id
//!     }
//!     fn set_id(&mut self, id: RowId) {
//!         self.id = id;
//!     }
//! }
//!
//! let db = Database::builder("./data")
//!     .register::<Category>(TableSpec::new().unique("name", |c: &Category| c.name.clone()))
//!     .open()?;
//!
//! let categories = db.table::<Category>()?;
//! let shoes = categories.insert(Category { id: TRANSIENT_ROW_ID, name: "shoes".into() })?;
//! assert_eq!(categories.select(shoes.id())?.map(|c| c.name), Some("shoes".into()));
//! # Ok::<(), simpledb_store::Error>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod db;
pub mod error;
mod file;
pub mod fkeys;
pub mod hooks;
pub mod schema;
pub mod table;

pub use db::{Database, DatabaseBuilder, Stores};
pub use error::{Error, Result};
pub use fkeys::{ForeignKeyBinding, ForeignKeyManager};
pub use hooks::{LifecycleHooks, NoHooks};
pub use schema::{DeletePolicy, ForeignKey, TableSpec, UniqueIndex};
pub use table::TableStore;

// Re-export the row contract so consumers depend on one crate.
pub use simpledb_types::{
    CodecError, FieldConstraint, Row, RowId, StoreConfig, ValidationError, TRANSIENT_ROW_ID,
};
