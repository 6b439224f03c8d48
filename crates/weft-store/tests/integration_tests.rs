//! Integration tests for weft-store
//!
//! These tests verify the full CRUD cycle for relationships, the
//! uniqueness/merge invariant, batch atomicity and on-disk persistence.

use weft_domain::{Direction, Relationship, RelationshipStore, RelationshipType};
use weft_store::SqliteStore;

fn rel(source: &str, target: &str, strength: f64) -> Relationship {
    Relationship::new(source, target, RelationshipType::Imports, strength, 0.9)
}

#[test]
fn test_batch_same_triple_twice_keeps_one_row_with_max() {
    let mut store = SqliteStore::open_in_memory().unwrap();

    store
        .add_batch(vec![rel("a.py", "b.py", 0.4), rel("a.py", "b.py", 0.7)])
        .unwrap();

    let all = store.all().unwrap();
    assert_eq!(all.len(), 1, "the triple is unique");
    assert_eq!(all[0].forward_strength, 0.7, "strength is the max of the merged values");
}

#[test]
fn test_directionality() {
    let mut store = SqliteStore::open_in_memory().unwrap();

    let r = Relationship::new("a.py", "b.py", RelationshipType::Imports, 0.9, 1.0)
        .with_reverse_strength(0.2);
    store.add(r).unwrap();

    let incoming = store.get_for_file("b.py", Direction::Incoming).unwrap();
    assert_eq!(incoming.len(), 1);
    assert_eq!(
        incoming[0].effective_strength(Direction::Incoming),
        0.2,
        "B's incoming view sees the reverse strength, not 0.9"
    );

    let outgoing = store.get_for_file("a.py", Direction::Outgoing).unwrap();
    assert_eq!(outgoing[0].effective_strength(Direction::Outgoing), 0.9);
}

#[test]
fn test_batch_atomicity_on_invalid_row() {
    let mut store = SqliteStore::open_in_memory().unwrap();

    let mut batch: Vec<Relationship> = (0..10)
        .map(|i| rel(&format!("src{}.py", i), "common.py", 0.5))
        .collect();
    // Row 5 is invalid: self-relationship
    batch[5] = rel("common.py", "common.py", 0.5);

    let result = store.add_batch(batch);
    assert!(result.is_err(), "the batch must fail");
    assert!(
        store.all().unwrap().is_empty(),
        "zero rows persisted after a failed batch"
    );
}

#[test]
fn test_get_for_file_both_directions() {
    let mut store = SqliteStore::open_in_memory().unwrap();

    store.add(rel("a.py", "b.py", 0.8)).unwrap();
    store.add(rel("b.py", "c.py", 0.6)).unwrap();
    store.add(rel("x.py", "y.py", 0.5)).unwrap();

    let both = store.get_for_file("b.py", Direction::Both).unwrap();
    assert_eq!(both.len(), 2);

    let outgoing = store.get_for_file("b.py", Direction::Outgoing).unwrap();
    assert_eq!(outgoing.len(), 1);
    assert_eq!(outgoing[0].target_path, "c.py");

    let incoming = store.get_for_file("b.py", Direction::Incoming).unwrap();
    assert_eq!(incoming.len(), 1);
    assert_eq!(incoming[0].source_path, "a.py");
}

#[test]
fn test_remove_by_type_and_all_types() {
    let mut store = SqliteStore::open_in_memory().unwrap();

    store.add(rel("a.py", "b.py", 0.8)).unwrap();
    store
        .add(Relationship::new(
            "a.py",
            "b.py",
            RelationshipType::References,
            0.4,
            0.7,
        ))
        .unwrap();

    let removed = store
        .remove("a.py", "b.py", Some(&RelationshipType::Imports))
        .unwrap();
    assert_eq!(removed, 1);
    assert_eq!(store.all().unwrap().len(), 1);

    let removed = store.remove("a.py", "b.py", None).unwrap();
    assert_eq!(removed, 1);
    assert!(store.all().unwrap().is_empty());
}

#[test]
fn test_remove_for_file_deletes_both_endpoints() {
    let mut store = SqliteStore::open_in_memory().unwrap();

    store.add(rel("a.py", "b.py", 0.8)).unwrap();
    store.add(rel("b.py", "c.py", 0.6)).unwrap();
    store.add(rel("x.py", "y.py", 0.5)).unwrap();

    let removed = store.remove_for_file("b.py").unwrap();
    assert_eq!(removed, 2);

    let survivors = store.all().unwrap();
    assert_eq!(survivors.len(), 1);
    assert_eq!(survivors[0].source_path, "x.py");
}

#[test]
fn test_updated_at_advances_on_merge() {
    let mut store = SqliteStore::open_in_memory().unwrap();

    let id = store.add(rel("a.py", "b.py", 0.4)).unwrap();
    let created = store.get(id).unwrap().unwrap();

    store.add(rel("a.py", "b.py", 0.7)).unwrap();
    let merged = store.get(id).unwrap().unwrap();

    assert_eq!(merged.created_at, created.created_at, "created_at is immutable");
    assert!(merged.updated_at > created.updated_at, "updated_at advances on merge");
}

#[test]
fn test_persistence_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("weft.db");

    {
        let mut store = SqliteStore::new(&db_path).unwrap();
        store.add(rel("a.py", "b.py", 0.8)).unwrap();
    }

    let store = SqliteStore::new(&db_path).unwrap();
    let all = store.all().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].source_path, "a.py");
}
