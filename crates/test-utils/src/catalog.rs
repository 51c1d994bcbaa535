//! A small commerce fixture domain for engine tests.
//!
//! Five tables exercising every engine feature:
//!
//! - `countries` - unique `code`, seeded lookup catalog
//! - `categories` - unique `name`, one seeded default row
//! - `products` - unique `sku`, foreign key into `categories` (block
//!   on delete), insert trigger creating a stock record, delete
//!   trigger vetoing while stock is on hand, one seeded default row
//! - `stock_records` - foreign key into `products` (cascade on delete)
//! - `imported_orders` - two-namespace table (local sequence starts at
//!   `RowId::MIN`), defaults stamping a confirmation code

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use simpledb_store::{
    Database, DatabaseBuilder, DeletePolicy, Error, FieldConstraint, LifecycleHooks, Result, Row,
    RowId, Stores, TableSpec, TRANSIENT_ROW_ID,
};

// ============================================================================
// Rows
// ============================================================================

/// A country lookup row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Country {
    /// Row identity.
    pub id: RowId,
    /// ISO-style two-letter code, unique.
    pub code: String,
    /// Display name.
    pub name: String,
}

impl Country {
    /// A transient country row.
    #[must_use]
    pub fn new(code: &str, name: &str) -> Self {
        Self { id: TRANSIENT_ROW_ID, code: code.to_string(), name: name.to_string() }
    }
}

impl Row for Country {
    const TABLE: &'static str = "countries";

    fn id(&self) -> RowId {
        self.id
    }

    fn set_id(&mut self, id: RowId) {
        self.id = id;
    }
}

/// A product category row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Row identity.
    pub id: RowId,
    /// Category name, unique.
    pub name: String,
}

impl Category {
    /// A transient category row.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self { id: TRANSIENT_ROW_ID, name: name.to_string() }
    }

    /// A category row with an explicit id (seed usage).
    #[must_use]
    pub fn with_id(id: RowId, name: &str) -> Self {
        Self { id, name: name.to_string() }
    }
}

impl Row for Category {
    const TABLE: &'static str = "categories";

    fn id(&self) -> RowId {
        self.id
    }

    fn set_id(&mut self, id: RowId) {
        self.id = id;
    }
}

/// A product row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Row identity.
    pub id: RowId,
    /// Owning category.
    pub category_id: RowId,
    /// Stock-keeping unit, unique.
    pub sku: String,
    /// Display name.
    pub name: String,
}

impl Product {
    /// A transient product row.
    #[must_use]
    pub fn new(category_id: RowId, sku: &str, name: &str) -> Self {
        Self {
            id: TRANSIENT_ROW_ID,
            category_id,
            sku: sku.to_string(),
            name: name.to_string(),
        }
    }
}

impl Row for Product {
    const TABLE: &'static str = "products";

    fn id(&self) -> RowId {
        self.id
    }

    fn set_id(&mut self, id: RowId) {
        self.id = id;
    }
}

/// Stock on hand for one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockRecord {
    /// Row identity.
    pub id: RowId,
    /// The product this stock belongs to.
    pub product_id: RowId,
    /// Units on hand.
    pub on_hand: u32,
}

impl StockRecord {
    /// A transient, empty stock record for a product.
    #[must_use]
    pub fn new(product_id: RowId) -> Self {
        Self { id: TRANSIENT_ROW_ID, product_id, on_hand: 0 }
    }
}

impl Row for StockRecord {
    const TABLE: &'static str = "stock_records";

    fn id(&self) -> RowId {
        self.id
    }

    fn set_id(&mut self, id: RowId) {
        self.id = id;
    }
}

/// An order imported from an external system.
///
/// External orders arrive with nonnegative ids minted elsewhere;
/// locally created rows draw ids from `RowId::MIN` upward so the two
/// populations never collide in one table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportedOrder {
    /// Row identity (external or locally minted).
    pub id: RowId,
    /// External order reference, unique.
    pub reference: String,
    /// Confirmation code, stamped by defaults when absent.
    pub confirmation_code: String,
}

impl ImportedOrder {
    /// A transient, locally created order.
    #[must_use]
    pub fn new(reference: &str) -> Self {
        Self {
            id: TRANSIENT_ROW_ID,
            reference: reference.to_string(),
            confirmation_code: String::new(),
        }
    }

    /// An order carrying an id minted by the external system.
    #[must_use]
    pub fn external(id: RowId, reference: &str) -> Self {
        Self { id, reference: reference.to_string(), confirmation_code: String::new() }
    }
}

impl Row for ImportedOrder {
    const TABLE: &'static str = "imported_orders";

    fn id(&self) -> RowId {
        self.id
    }

    fn set_id(&mut self, id: RowId) {
        self.id = id;
    }
}

// ============================================================================
// Specs
// ============================================================================

fn country_code(c: &Country) -> &str {
    &c.code
}

fn country_name(c: &Country) -> &str {
    &c.name
}

fn category_name(c: &Category) -> &str {
    &c.name
}

fn product_sku(p: &Product) -> &str {
    &p.sku
}

fn product_name(p: &Product) -> &str {
    &p.name
}

fn order_reference(o: &ImportedOrder) -> &str {
    &o.reference
}

/// Spec for the countries table.
#[must_use]
pub fn country_spec() -> TableSpec<Country> {
    TableSpec::new()
        .unique("code", |c: &Country| c.code.clone())
        .constraint(FieldConstraint::required("code", country_code).max_len(2))
        .constraint(FieldConstraint::required("name", country_name).max_len(64))
}

/// Spec for the categories table.
#[must_use]
pub fn category_spec() -> TableSpec<Category> {
    TableSpec::new()
        .unique("name", |c: &Category| c.name.clone())
        .constraint(FieldConstraint::required("name", category_name).max_len(64))
}

/// Spec for the products table.
#[must_use]
pub fn product_spec() -> TableSpec<Product> {
    TableSpec::new()
        .unique("sku", |p: &Product| p.sku.clone())
        .foreign_key(
            "category_id",
            |p| Some(p.category_id),
            Category::TABLE,
            DeletePolicy::Block,
        )
        .constraint(FieldConstraint::required("sku", product_sku).min_len(3))
        .constraint(FieldConstraint::required("name", product_name).max_len(128))
}

/// Spec for the stock records table.
#[must_use]
pub fn stock_spec() -> TableSpec<StockRecord> {
    TableSpec::new().foreign_key(
        "product_id",
        |s| Some(s.product_id),
        Product::TABLE,
        DeletePolicy::Cascade,
    )
}

/// Spec for the imported orders table.
#[must_use]
pub fn imported_order_spec() -> TableSpec<ImportedOrder> {
    TableSpec::new()
        .sequence_origin(RowId::MIN)
        .unique("reference", |o: &ImportedOrder| o.reference.clone())
        .constraint(FieldConstraint::required("reference", order_reference))
}

// ============================================================================
// Hooks
// ============================================================================

/// Seeds the country lookup catalog.
pub struct CountryHooks;

impl LifecycleHooks<Country> for CountryHooks {
    fn seed_rows(&self) -> Vec<Country> {
        vec![
            Country::new("US", "United States"),
            Country::new("DE", "Germany"),
            Country::new("JP", "Japan"),
        ]
    }
}

/// Seeds one default category.
pub struct CategoryHooks;

impl LifecycleHooks<Category> for CategoryHooks {
    fn seed_rows(&self) -> Vec<Category> {
        vec![Category::with_id(1, "General")]
    }
}

/// Product triggers: create the dependent stock record on insert,
/// refuse deletion while stock is on hand.
pub struct ProductHooks;

impl LifecycleHooks<Product> for ProductHooks {
    fn seed_rows(&self) -> Vec<Product> {
        vec![Product {
            id: 1,
            category_id: 1,
            sku: "CAT-0001".to_string(),
            name: "Catalog".to_string(),
        }]
    }

    fn on_insert(&self, stores: &Stores, row: &Product) -> Result<()> {
        stores.table::<StockRecord>()?.insert(StockRecord::new(row.id()))?;
        Ok(())
    }

    fn on_delete(&self, stores: &Stores, row: &Product) -> Result<()> {
        let stock = stores.table::<StockRecord>()?;
        let on_hand: u32 = stock
            .select_where(|s| s.product_id == row.id())?
            .iter()
            .map(|s| s.on_hand)
            .sum();
        if on_hand > 0 {
            return Err(Error::Vetoed {
                table: Product::TABLE,
                reason: format!("{on_hand} units still on hand"),
            });
        }
        Ok(())
    }
}

/// Imported-order defaults: stamp a confirmation code when absent.
pub struct ImportedOrderHooks;

impl LifecycleHooks<ImportedOrder> for ImportedOrderHooks {
    fn apply_defaults(&self, row: &mut ImportedOrder) {
        if row.confirmation_code.is_empty() {
            row.confirmation_code = next_confirmation_code();
        }
    }
}

static CONFIRMATION_COUNTER: AtomicU64 = AtomicU64::new(1);

fn next_confirmation_code() -> String {
    let n = CONFIRMATION_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("CONF-{n:06}")
}

// ============================================================================
// Bootstrap helper
// ============================================================================

/// Registers the full fixture domain on a builder.
#[must_use]
pub fn register_catalog(builder: DatabaseBuilder) -> DatabaseBuilder {
    builder
        .register_with_hooks(country_spec(), CountryHooks)
        .register_with_hooks(category_spec(), CategoryHooks)
        .register_with_hooks(product_spec(), ProductHooks)
        .register::<StockRecord>(stock_spec())
        .register_with_hooks(imported_order_spec(), ImportedOrderHooks)
}

/// Opens a catalog database rooted at `root`.
///
/// # Errors
///
/// Propagates any engine error raised during bootstrap.
pub fn open_catalog(root: impl Into<std::path::PathBuf>) -> Result<Database> {
    register_catalog(Database::builder(root)).open()
}
