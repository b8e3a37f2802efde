//! MemoryRemote contract: CRUD semantics, criteria matching, and
//! idempotency-key deduplication.

mod support;

use causeway_core::errors::RemoteError;
use causeway_core::traits::RemoteStore;
use causeway_sync::MemoryRemote;
use serde_json::json;

use support::doc;

#[tokio::test]
async fn insert_then_select_roundtrips() {
    let remote = MemoryRemote::new();
    let row = doc(json!({"id": 1, "title": "a"}));

    let created = remote.insert("notes", &row, "key-1").await.unwrap();
    assert_eq!(created, vec![row.clone()]);
    assert_eq!(remote.select("notes", None).await.unwrap(), vec![row]);
}

#[tokio::test]
async fn select_filters_by_criteria() {
    let remote = MemoryRemote::new();
    remote.seed(
        "notes",
        vec![
            doc(json!({"id": 1, "done": false})),
            doc(json!({"id": 2, "done": true})),
            doc(json!({"id": 3, "done": true})),
        ],
    );

    let criteria = doc(json!({"done": true}));
    let rows = remote.select("notes", Some(&criteria)).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|row| row["done"] == json!(true)));
}

#[tokio::test]
async fn update_overwrites_matching_rows() {
    let remote = MemoryRemote::new();
    remote.seed(
        "notes",
        vec![
            doc(json!({"id": 1, "title": "a", "done": false})),
            doc(json!({"id": 2, "title": "b", "done": false})),
        ],
    );

    let updated = remote
        .update(
            "notes",
            &doc(json!({"done": true})),
            &doc(json!({"id": 2})),
            "key-1",
        )
        .await
        .unwrap();
    assert_eq!(updated.len(), 1);
    assert_eq!(updated[0]["done"], json!(true));
    assert_eq!(updated[0]["title"], json!("b"));

    let untouched = remote
        .select("notes", Some(&doc(json!({"id": 1}))))
        .await
        .unwrap();
    assert_eq!(untouched[0]["done"], json!(false));
}

#[tokio::test]
async fn update_with_no_match_is_rejected() {
    let remote = MemoryRemote::new();
    let err = remote
        .update(
            "notes",
            &doc(json!({"done": true})),
            &doc(json!({"id": 9})),
            "key-1",
        )
        .await
        .unwrap_err();
    assert!(matches!(err, RemoteError::Rejected { .. }));
}

#[tokio::test]
async fn delete_removes_matching_rows_and_rejects_misses() {
    let remote = MemoryRemote::new();
    remote.seed(
        "notes",
        vec![doc(json!({"id": 1})), doc(json!({"id": 2}))],
    );

    remote
        .delete("notes", &doc(json!({"id": 1})), "key-1")
        .await
        .unwrap();
    assert_eq!(remote.row_count("notes"), 1);

    let err = remote
        .delete("notes", &doc(json!({"id": 1})), "key-2")
        .await
        .unwrap_err();
    assert!(matches!(err, RemoteError::Rejected { .. }));
}

// ── Idempotency keys ──────────────────────────────────────────────────────

#[tokio::test]
async fn repeated_key_applies_the_insert_once() {
    let remote = MemoryRemote::new();
    let row = doc(json!({"id": 1}));

    remote.insert("notes", &row, "key-1").await.unwrap();
    remote.insert("notes", &row, "key-1").await.unwrap();
    assert_eq!(remote.row_count("notes"), 1);

    // A different key is a different logical write.
    remote.insert("notes", &row, "key-2").await.unwrap();
    assert_eq!(remote.row_count("notes"), 2);
}

#[tokio::test]
async fn empty_key_never_deduplicates() {
    let remote = MemoryRemote::new();
    let row = doc(json!({"id": 1}));

    remote.insert("notes", &row, "").await.unwrap();
    remote.insert("notes", &row, "").await.unwrap();
    assert_eq!(remote.row_count("notes"), 2);
}

#[tokio::test]
async fn rejected_call_leaves_its_key_unconsumed() {
    let remote = MemoryRemote::new();
    let changes = doc(json!({"done": true}));
    let criteria = doc(json!({"id": 1}));

    // First attempt finds nothing and is rejected.
    let err = remote
        .update("notes", &changes, &criteria, "key-1")
        .await
        .unwrap_err();
    assert!(matches!(err, RemoteError::Rejected { .. }));

    // Once the row exists, the same key must still apply.
    remote.seed("notes", vec![doc(json!({"id": 1, "done": false}))]);
    let updated = remote
        .update("notes", &changes, &criteria, "key-1")
        .await
        .unwrap();
    assert_eq!(updated[0]["done"], json!(true));
}

#[tokio::test]
async fn repeated_key_delete_acks_without_error() {
    let remote = MemoryRemote::new();
    remote.seed("notes", vec![doc(json!({"id": 1}))]);

    remote
        .delete("notes", &doc(json!({"id": 1})), "key-1")
        .await
        .unwrap();
    // The replayed delete matches nothing, but the key marks it as already
    // applied, so it acks instead of rejecting.
    remote
        .delete("notes", &doc(json!({"id": 1})), "key-1")
        .await
        .unwrap();
    assert_eq!(remote.row_count("notes"), 0);
}
