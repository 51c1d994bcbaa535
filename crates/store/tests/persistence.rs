//! Backing-file round trips, truncation, and the two-namespace sequence.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use serde::{Deserialize, Serialize};
use simpledb_store::{Database, Error, Row, RowId, TableSpec, TRANSIENT_ROW_ID};
use simpledb_test_utils::{
    catalog::{open_catalog, Category, ImportedOrder},
    TestDir,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Gadget {
    id: RowId,
    label: String,
}

impl Gadget {
    fn new(label: &str) -> Self {
        Self { id: TRANSIENT_ROW_ID, label: label.to_string() }
    }
}

impl Row for Gadget {
    const TABLE: &'static str = "gadgets";

    fn id(&self) -> RowId {
        self.id
    }

    fn set_id(&mut self, id: RowId) {
        self.id = id;
    }
}

fn open_gadgets(root: &std::path::Path) -> Database {
    Database::builder(root)
        .register::<Gadget>(TableSpec::new())
        .open()
        .expect("open gadget store")
}

#[test]
fn test_round_trip_preserves_rows_order_and_sequence() {
    let dir = TestDir::new();
    let root = dir.join("store");

    let written: Vec<Gadget> = {
        let db = open_gadgets(&root);
        let gadgets = db.table::<Gadget>().expect("table");
        (0..8)
            .map(|n| gadgets.insert(Gadget::new(&format!("g{n}"))).expect("insert"))
            .collect()
    };

    let db = open_gadgets(&root);
    let gadgets = db.table::<Gadget>().expect("table");

    let reloaded = gadgets.select_all().expect("select");
    assert_eq!(reloaded, written, "rows, order, and ids must survive reload");
    assert_eq!(gadgets.primary_sequence().expect("sequence"), 8);
}

#[test]
fn test_truncate_keeps_sequence_within_process() {
    let dir = TestDir::new();
    let db = open_gadgets(&dir.join("store"));
    let gadgets = db.table::<Gadget>().expect("table");

    for n in 0..3 {
        gadgets.insert(Gadget::new(&format!("g{n}"))).expect("insert");
    }
    gadgets.truncate().expect("truncate");

    assert_eq!(gadgets.record_count().expect("count"), 0);
    assert_eq!(gadgets.primary_sequence().expect("sequence"), 3);

    let next = gadgets.insert(Gadget::new("after")).expect("insert");
    assert_eq!(next.id, 3, "ids handed out before the truncate are never reused");
}

#[test]
fn test_truncate_keeps_sequence_across_reload() {
    let dir = TestDir::new();
    let root = dir.join("store");

    {
        let db = open_gadgets(&root);
        let gadgets = db.table::<Gadget>().expect("table");
        for n in 0..5 {
            gadgets.insert(Gadget::new(&format!("g{n}"))).expect("insert");
        }
        gadgets.truncate().expect("truncate");
    }

    let db = open_gadgets(&root);
    let gadgets = db.table::<Gadget>().expect("table");
    assert_eq!(gadgets.record_count().expect("count"), 0);
    assert_eq!(gadgets.primary_sequence().expect("sequence"), 5);
}

#[test]
fn test_failed_insert_leaves_file_bytes_untouched() {
    let dir = TestDir::new();
    let root = dir.join("store");
    let db = open_catalog(&root).expect("open");
    let categories = db.table::<Category>().expect("table");

    categories.insert(Category::new("fixed")).expect("insert");
    let file = root.join("categories.tbl");
    let before = std::fs::read(&file).expect("read file");

    let err = categories
        .insert(Category::new("fixed"))
        .expect_err("duplicate must fail");
    assert!(matches!(&err, Error::UniqueIndex { .. }), "got: {err}");

    let after = std::fs::read(&file).expect("read file");
    assert_eq!(before, after, "a failed insert must not touch the backing file");
}

#[test]
fn test_two_namespace_sequence() {
    let dir = TestDir::new();
    let root = dir.join("store");

    {
        let db = open_catalog(&root).expect("open");
        let orders = db.table::<ImportedOrder>().expect("table");

        let local_a = orders.insert(ImportedOrder::new("L-1")).expect("insert");
        let local_b = orders.insert(ImportedOrder::new("L-2")).expect("insert");
        assert_eq!(local_a.id, RowId::MIN);
        assert_eq!(local_b.id, RowId::MIN + 1);

        // Externally minted ids live in the nonnegative space and are
        // preserved as supplied.
        let external = orders.insert(ImportedOrder::external(42, "X-42")).expect("insert");
        assert_eq!(external.id, 42);

        // The local sequence is unaffected by external ids.
        let local_c = orders.insert(ImportedOrder::new("L-3")).expect("insert");
        assert_eq!(local_c.id, RowId::MIN + 2);
    }

    let db = open_catalog(&root).expect("reopen");
    let orders = db.table::<ImportedOrder>().expect("table");
    assert_eq!(orders.record_count().expect("count"), 4);
    assert_eq!(
        orders.primary_sequence().expect("sequence"),
        RowId::MIN + 3,
        "the persisted sequence stays in the local namespace"
    );
}

#[test]
fn test_update_and_delete_are_persisted() {
    let dir = TestDir::new();
    let root = dir.join("store");

    {
        let db = open_gadgets(&root);
        let gadgets = db.table::<Gadget>().expect("table");
        let mut keep = gadgets.insert(Gadget::new("keep")).expect("insert");
        let remove = gadgets.insert(Gadget::new("remove")).expect("insert");

        keep.label = "kept".to_string();
        gadgets.update(keep).expect("update");
        gadgets.delete(&remove).expect("delete");
    }

    let db = open_gadgets(&root);
    let gadgets = db.table::<Gadget>().expect("table");
    let rows = gadgets.select_all().expect("select");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].label, "kept");
}

#[test]
fn test_corrupted_file_fails_open() {
    let dir = TestDir::new();
    let root = dir.join("store");
    std::fs::create_dir_all(&root).expect("mkdir");
    std::fs::write(root.join("gadgets.tbl"), "definitely not a table file\n").expect("write");

    let err = Database::builder(&root)
        .register::<Gadget>(TableSpec::new())
        .open()
        .expect_err("garbage file must fail open");
    assert!(matches!(&err, Error::Codec { .. } | Error::Corrupted { .. }), "got: {err}");
}

#[test]
fn test_duplicate_ids_in_file_fail_open() {
    let dir = TestDir::new();
    let root = dir.join("store");
    std::fs::create_dir_all(&root).expect("mkdir");
    std::fs::write(
        root.join("gadgets.tbl"),
        concat!(
            "{\"table\":\"gadgets\",\"sequence\":2}\n",
            "{\"id\":0,\"label\":\"a\"}\n",
            "{\"id\":0,\"label\":\"b\"}\n",
        ),
    )
    .expect("write");

    let err = Database::builder(&root)
        .register::<Gadget>(TableSpec::new())
        .open()
        .expect_err("duplicate ids must fail open");
    assert!(matches!(&err, Error::Corrupted { .. }), "got: {err}");
}

#[test]
fn test_stale_header_sequence_is_repaired_on_load() {
    // A hand-edited file whose header lags behind its rows must not
    // make the sequence re-issue an existing id.
    let dir = TestDir::new();
    let root = dir.join("store");
    std::fs::create_dir_all(&root).expect("mkdir");
    std::fs::write(
        root.join("gadgets.tbl"),
        concat!(
            "{\"table\":\"gadgets\",\"sequence\":0}\n",
            "{\"id\":0,\"label\":\"a\"}\n",
            "{\"id\":1,\"label\":\"b\"}\n",
        ),
    )
    .expect("write");

    let db = open_gadgets(&root);
    let gadgets = db.table::<Gadget>().expect("table");
    let next = gadgets.insert(Gadget::new("c")).expect("insert");
    assert_eq!(next.id, 2);
}
