//! Uniqueness and referential-integrity enforcement.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use simpledb_store::Error;
use simpledb_test_utils::{
    catalog::{open_catalog, Category, Product, StockRecord},
    TestDir,
};

#[test]
fn test_unique_index_rejects_duplicate() {
    let dir = TestDir::new();
    let db = open_catalog(dir.join("store")).expect("open");
    let categories = db.table::<Category>().expect("table");

    categories.insert(Category::new("music")).expect("insert");

    let err = categories
        .insert(Category::new("music"))
        .expect_err("duplicate name must fail");
    assert!(
        matches!(&err, Error::UniqueIndex { table: "categories", index: "name", value } if value == "music"),
        "got: {err}"
    );
}

#[test]
fn test_failed_unique_insert_leaves_count_unchanged() {
    // Three unique names; a fourth colliding with the second must fail
    // and leave the record count at three.
    let dir = TestDir::new();
    let db = open_catalog(dir.join("store")).expect("open");
    let categories = db.table::<Category>().expect("table");
    categories.truncate().expect("start from an empty table");

    for name in ["first", "second", "third"] {
        categories.insert(Category::new(name)).expect("insert");
    }
    assert_eq!(categories.record_count().expect("count"), 3);

    let err = categories
        .insert(Category::new("second"))
        .expect_err("duplicate must fail");
    assert!(matches!(&err, Error::UniqueIndex { .. }), "got: {err}");
    assert_eq!(categories.record_count().expect("count"), 3);
}

#[test]
fn test_unique_check_excludes_row_itself_on_update() {
    let dir = TestDir::new();
    let db = open_catalog(dir.join("store")).expect("open");
    let categories = db.table::<Category>().expect("table");

    let mut row = categories.insert(Category::new("outdoor")).expect("insert");

    // Re-saving the same name on the same row is not a collision.
    categories.update(row.clone()).expect("update with own name");

    // Taking another row's name is.
    row.name = "General".to_string();
    let err = categories.update(row).expect_err("collision with seed row");
    assert!(matches!(&err, Error::UniqueIndex { .. }), "got: {err}");
}

#[test]
fn test_insert_with_unresolved_reference_fails() {
    let dir = TestDir::new();
    let db = open_catalog(dir.join("store")).expect("open");
    let products = db.table::<Product>().expect("table");

    let before = products.record_count().expect("count");
    let err = products
        .insert(Product::new(999, "SKU-404", "Phantom"))
        .expect_err("missing category must fail");
    assert!(
        matches!(
            &err,
            Error::UnresolvedReference {
                table: "products",
                field: "category_id",
                id: 999,
                references: "categories"
            }
        ),
        "got: {err}"
    );
    assert_eq!(products.record_count().expect("count"), before);
}

#[test]
fn test_blocked_delete_leaves_both_tables_unchanged() {
    let dir = TestDir::new();
    let db = open_catalog(dir.join("store")).expect("open");
    let categories = db.table::<Category>().expect("table");
    let products = db.table::<Product>().expect("table");

    // The seeded product (id 1) references the seeded category (id 1).
    let category_count = categories.record_count().expect("count");
    let product_count = products.record_count().expect("count");

    let err = categories.delete_id(1).expect_err("referenced category must not delete");
    assert!(
        matches!(
            &err,
            Error::StillReferenced { table: "categories", id: 1, dependent: "products", .. }
        ),
        "got: {err}"
    );

    assert_eq!(categories.record_count().expect("count"), category_count);
    assert_eq!(products.record_count().expect("count"), product_count);
}

#[test]
fn test_delete_allowed_once_dependents_are_gone() {
    let dir = TestDir::new();
    let db = open_catalog(dir.join("store")).expect("open");
    let categories = db.table::<Category>().expect("table");
    let products = db.table::<Product>().expect("table");

    let spare = categories.insert(Category::new("spare")).expect("insert");
    let gadget = products
        .insert(Product::new(spare.id, "SKU-100", "Gadget"))
        .expect("insert");

    let err = categories.delete_id(spare.id).expect_err("still referenced");
    assert!(matches!(&err, Error::StillReferenced { .. }), "got: {err}");

    products.delete(&gadget).expect("delete product");
    categories.delete_id(spare.id).expect("delete now-unreferenced category");
}

#[test]
fn test_insert_trigger_creates_exactly_one_stock_record() {
    let dir = TestDir::new();
    let db = open_catalog(dir.join("store")).expect("open");
    let products = db.table::<Product>().expect("table");
    let stock = db.table::<StockRecord>().expect("table");

    let before = stock.record_count().expect("count");
    let widget = products
        .insert(Product::new(1, "SKU-200", "Widget"))
        .expect("insert");

    let rows = stock
        .select_where(|s| s.product_id == widget.id)
        .expect("select stock");
    assert_eq!(rows.len(), 1, "insert trigger must create exactly one stock record");
    assert_eq!(rows[0].on_hand, 0);
    assert_eq!(stock.record_count().expect("count"), before + 1);
}

#[test]
fn test_delete_veto_while_stock_on_hand() {
    let dir = TestDir::new();
    let db = open_catalog(dir.join("store")).expect("open");
    let products = db.table::<Product>().expect("table");
    let stock = db.table::<StockRecord>().expect("table");

    let widget = products
        .insert(Product::new(1, "SKU-300", "Widget"))
        .expect("insert");

    let mut on_hand = stock
        .select_where(|s| s.product_id == widget.id)
        .expect("select stock")
        .pop()
        .expect("stock row exists");
    on_hand.on_hand = 5;
    stock.update(on_hand.clone()).expect("receive stock");

    let product_count = products.record_count().expect("count");
    let stock_count = stock.record_count().expect("count");

    let err = products.delete(&widget).expect_err("stock on hand must veto");
    assert!(
        matches!(&err, Error::Vetoed { table: "products", reason } if reason.contains("5 units")),
        "got: {err}"
    );
    assert_eq!(products.record_count().expect("count"), product_count);
    assert_eq!(stock.record_count().expect("count"), stock_count);

    // Draining the stock clears the veto; the cascade then removes the
    // stock record together with the product.
    on_hand.on_hand = 0;
    stock.update(on_hand).expect("drain stock");
    products.delete(&widget).expect("delete product");

    assert!(products.select(widget.id).expect("select").is_none());
    assert!(stock
        .select_where(|s| s.product_id == widget.id)
        .expect("select stock")
        .is_empty());
}

#[test]
fn test_cascade_removes_only_dependents_of_deleted_row() {
    let dir = TestDir::new();
    let db = open_catalog(dir.join("store")).expect("open");
    let products = db.table::<Product>().expect("table");
    let stock = db.table::<StockRecord>().expect("table");

    let keep = products.insert(Product::new(1, "SKU-400", "Keep")).expect("insert");
    let doomed = products.insert(Product::new(1, "SKU-401", "Doomed")).expect("insert");

    products.delete(&doomed).expect("delete");

    assert_eq!(
        stock.select_where(|s| s.product_id == keep.id).expect("select").len(),
        1,
        "unrelated stock must survive the cascade"
    );
    assert!(stock.select_where(|s| s.product_id == doomed.id).expect("select").is_empty());
}

#[test]
fn test_field_constraints_are_enforced() {
    let dir = TestDir::new();
    let db = open_catalog(dir.join("store")).expect("open");
    let products = db.table::<Product>().expect("table");
    let categories = db.table::<Category>().expect("table");

    let err = categories
        .insert(Category::new(""))
        .expect_err("empty name must fail");
    assert!(
        matches!(&err, Error::InvalidField { table: "categories", field: "name", .. }),
        "got: {err}"
    );

    let err = products
        .insert(Product::new(1, "XY", "Too-short SKU"))
        .expect_err("short sku must fail");
    assert!(
        matches!(&err, Error::InvalidField { table: "products", field: "sku", rule } if rule.contains("minimum 3")),
        "got: {err}"
    );
}
