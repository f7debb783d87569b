#![allow(clippy::unwrap_used)]

use super::*;

fn expense(description: &str, amount: i64) -> NewExpense {
    NewExpense::new(description, amount).unwrap()
}

fn seed(store: &Store, items: &[(&str, i64)]) -> Vec<i64> {
    items
        .iter()
        .map(|(desc, amount)| store.create(&expense(desc, *amount)).unwrap())
        .collect()
}

fn pairs(store: &Store) -> Vec<(String, i64)> {
    store
        .get_all()
        .unwrap()
        .into_iter()
        .map(|e| (e.description, e.amount))
        .collect()
}

// ── Create / read ─────────────────────────────────────────────

#[test]
fn test_fresh_store_is_empty() {
    let store = Store::open_in_memory().unwrap();
    assert!(store.get_all().unwrap().is_empty());
}

#[test]
fn test_create_and_get_all() {
    let store = Store::open_in_memory().unwrap();
    let new = expense("coffee", 5);
    let id = store.create(&new).unwrap();

    let all = store.get_all().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, id);
    assert_eq!(all[0].description, "coffee");
    assert_eq!(all[0].amount, 5);
    assert_eq!(all[0].date, new.date());
}

#[test]
fn test_ids_assigned_sequentially() {
    let store = Store::open_in_memory().unwrap();
    let ids = seed(&store, &[("a", 1), ("b", 2), ("c", 3)]);
    assert_eq!(ids, vec![1, 2, 3]);
}

#[test]
fn test_get_all_ordered_by_id() {
    let store = Store::open_in_memory().unwrap();
    seed(&store, &[("first", 3), ("second", 1), ("third", 2)]);

    let ids: Vec<i64> = store.get_all().unwrap().iter().map(|e| e.id).collect();
    let mut sorted = ids.clone();
    sorted.sort();
    assert_eq!(ids, sorted);
    assert_eq!(
        pairs(&store),
        vec![
            ("first".to_string(), 3),
            ("second".to_string(), 1),
            ("third".to_string(), 2)
        ]
    );
}

#[test]
fn test_unicode_description_round_trips() {
    let store = Store::open_in_memory().unwrap();
    seed(&store, &[("кофе и круассан", 7)]);
    assert_eq!(pairs(&store), vec![("кофе и круассан".to_string(), 7)]);
}

// ── Exists ────────────────────────────────────────────────────

#[test]
fn test_exists() {
    let store = Store::open_in_memory().unwrap();
    let ids = seed(&store, &[("coffee", 5)]);
    assert!(store.exists(ids[0]).unwrap());
    assert!(!store.exists(99999).unwrap());
    assert!(!store.exists(-1).unwrap());
}

// ── Update ────────────────────────────────────────────────────

#[test]
fn test_update_replaces_fields_of_one_row() {
    let store = Store::open_in_memory().unwrap();
    let ids = seed(&store, &[("coffee", 5), ("book", 20)]);

    let changed = store.update(ids[0], &expense("tea", 3)).unwrap();
    assert_eq!(changed, 1);
    assert_eq!(
        pairs(&store),
        vec![("tea".to_string(), 3), ("book".to_string(), 20)]
    );
}

#[test]
fn test_update_preserves_date() {
    let store = Store::open_in_memory().unwrap();
    let ids = seed(&store, &[("coffee", 5)]);
    let original = store.get_all().unwrap()[0].date;

    store.update(ids[0], &expense("tea", 3)).unwrap();
    assert_eq!(store.get_all().unwrap()[0].date, original);
}

#[test]
fn test_update_missing_row_is_noop() {
    let store = Store::open_in_memory().unwrap();
    seed(&store, &[("coffee", 5)]);

    let changed = store.update(42, &expense("tea", 3)).unwrap();
    assert_eq!(changed, 0);
    assert_eq!(pairs(&store), vec![("coffee".to_string(), 5)]);
}

// ── Delete ────────────────────────────────────────────────────

#[test]
fn test_delete() {
    let store = Store::open_in_memory().unwrap();
    let ids = seed(&store, &[("coffee", 5), ("book", 20)]);

    assert_eq!(store.delete(ids[0]).unwrap(), 1);
    assert!(!store.exists(ids[0]).unwrap());
    assert_eq!(pairs(&store), vec![("book".to_string(), 20)]);
}

#[test]
fn test_delete_missing_row_is_noop() {
    let store = Store::open_in_memory().unwrap();
    seed(&store, &[("coffee", 5)]);
    assert_eq!(store.delete(7).unwrap(), 0);
    assert_eq!(pairs(&store), vec![("coffee".to_string(), 5)]);
}

#[test]
fn test_ids_not_reused_after_delete() {
    let store = Store::open_in_memory().unwrap();
    let ids = seed(&store, &[("a", 1), ("b", 2)]);
    store.delete(ids[1]).unwrap();

    let next = store.create(&expense("c", 3)).unwrap();
    assert_eq!(next, 3);
}

// ── Summary ───────────────────────────────────────────────────

#[test]
fn test_summary_empty() {
    let store = Store::open_in_memory().unwrap();
    assert_eq!(store.summary().unwrap(), 0);
}

#[test]
fn test_summary() {
    let store = Store::open_in_memory().unwrap();
    seed(&store, &[("a", 10), ("b", 20), ("c", 30)]);
    assert_eq!(store.summary().unwrap(), 60);
}

#[test]
fn test_summary_after_everything_deleted() {
    let store = Store::open_in_memory().unwrap();
    let ids = seed(&store, &[("a", 10)]);
    store.delete(ids[0]).unwrap();
    assert_eq!(store.summary().unwrap(), 0);
}

#[test]
fn test_summary_overflow() {
    let store = Store::open_in_memory().unwrap();
    seed(&store, &[("a", i64::MAX), ("b", 1)]);
    let err = store.summary().unwrap_err();
    assert!(matches!(err, ExpenseError::SummaryOverflow));
    assert_eq!(
        err.to_string(),
        "Total of all expenses is too large to compute"
    );
}

#[test]
fn test_coffee_and_book_scenario() {
    let store = Store::open_in_memory().unwrap();
    let ids = seed(&store, &[("coffee", 5), ("book", 20)]);
    assert_eq!(store.summary().unwrap(), 25);

    store.delete(ids[0]).unwrap();
    assert_eq!(store.summary().unwrap(), 20);
    assert_eq!(pairs(&store), vec![("book".to_string(), 20)]);
}

// ── Reset ─────────────────────────────────────────────────────

#[test]
fn test_reset_clears_and_restarts_ids() {
    let mut store = Store::open_in_memory().unwrap();
    seed(&store, &[("a", 1), ("b", 2), ("c", 3)]);

    store.reset().unwrap();
    assert!(store.get_all().unwrap().is_empty());
    assert_eq!(store.summary().unwrap(), 0);

    let id = store.create(&expense("d", 4)).unwrap();
    assert_eq!(id, 1);
}

#[test]
fn test_reset_twice() {
    let mut store = Store::open_in_memory().unwrap();
    seed(&store, &[("a", 1)]);

    store.reset().unwrap();
    assert!(store.get_all().unwrap().is_empty());
    store.reset().unwrap();
    assert!(store.get_all().unwrap().is_empty());

    let fresh = Store::open_in_memory().unwrap();
    let fresh_id = fresh.create(&expense("x", 1)).unwrap();
    let reset_id = store.create(&expense("x", 1)).unwrap();
    assert_eq!(reset_id, fresh_id);
}

#[test]
fn test_reset_on_fresh_store() {
    let mut store = Store::open_in_memory().unwrap();
    store.reset().unwrap();
    assert_eq!(store.create(&expense("x", 1)).unwrap(), 1);
}

#[test]
fn test_reset_restarts_ids_for_lowercase_table() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lower.db");
    let target = path.to_str().unwrap();

    let conn = Connection::open(target).unwrap();
    conn.execute_batch(
        "CREATE TABLE expenses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            date TEXT NOT NULL,
            description TEXT NOT NULL,
            amount INTEGER NOT NULL
        );",
    )
    .unwrap();
    conn.close().unwrap();

    let mut store = Store::open(target, &StoreOptions::default()).unwrap();
    seed(&store, &[("a", 1), ("b", 2)]);
    store.reset().unwrap();
    assert_eq!(store.create(&expense("c", 3)).unwrap(), 1);
    store.close().unwrap();
}

// ── Schema migration ──────────────────────────────────────────

#[test]
fn test_schema_version_set() {
    let store = Store::open_in_memory().unwrap();
    let version: i32 = store
        .conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(version, schema::CURRENT_VERSION);
}

#[test]
fn test_double_migrate_idempotent() {
    let mut store = Store::open_in_memory().unwrap();
    seed(&store, &[("kept", 9)]);
    store.migrate().unwrap();
    assert_eq!(pairs(&store), vec![("kept".to_string(), 9)]);
}

#[test]
fn test_table_name_case_insensitive() {
    let store = Store::open_in_memory().unwrap();
    seed(&store, &[("a", 1)]);
    let count: i64 = store
        .conn
        .query_row("SELECT COUNT(*) FROM expenses", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

// ── File-backed store ─────────────────────────────────────────

#[test]
fn test_file_store_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("expenses.db");
    let target = path.to_str().unwrap();

    let store = Store::open(target, &StoreOptions::default()).unwrap();
    seed(&store, &[("coffee", 5), ("book", 20)]);
    store.close().unwrap();

    let store = Store::open(target, &StoreOptions::default()).unwrap();
    assert_eq!(store.summary().unwrap(), 25);
    assert_eq!(store.create(&expense("pen", 2)).unwrap(), 3);
    store.close().unwrap();
}

#[test]
fn test_open_uri_target() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("uri.db");
    let target = format!("file:{}?mode=rwc", path.display());

    let store = Store::open(&target, &StoreOptions::default()).unwrap();
    seed(&store, &[("a", 1)]);
    store.close().unwrap();
    assert!(path.exists());
}

#[test]
fn test_open_bad_path_is_persistence_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("nested").join("x.db");
    let result = Store::open(path.to_str().unwrap(), &StoreOptions::default());
    assert!(matches!(
        result,
        Err(ExpenseError::Persistence { .. })
    ));
}

// ── Interrupt ─────────────────────────────────────────────────

#[test]
fn test_interrupt_handle_aborts_running_query() {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    let store = Store::open_in_memory().unwrap();
    let handle = store.interrupt_handle();
    let done = Arc::new(AtomicBool::new(false));
    let interrupter = {
        let done = Arc::clone(&done);
        std::thread::spawn(move || {
            while !done.load(Ordering::SeqCst) {
                std::thread::sleep(Duration::from_millis(20));
                handle.interrupt();
            }
        })
    };

    let result = store.conn.query_row(
        "WITH RECURSIVE c(x) AS (SELECT 1 UNION ALL SELECT x + 1 FROM c) \
         SELECT COUNT(*) FROM c",
        [],
        |row| row.get::<_, i64>(0),
    );
    done.store(true, Ordering::SeqCst);
    interrupter.join().unwrap();

    let err = result.unwrap_err();
    assert_eq!(
        err.sqlite_error_code(),
        Some(rusqlite::ErrorCode::OperationInterrupted)
    );
}
