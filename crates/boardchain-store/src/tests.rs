use boardchain_types::{RecordId, User};

use crate::{Database, RecordState, StoreError};

fn user(name: &str) -> User {
    User { id: RecordId::new(0), name: name.to_string() }
}

#[tokio::test]
async fn insert_is_invisible_until_confirmed() {
    let db = Database::new();
    let receipt = db.users.insert(user("ada")).await.unwrap();
    let id = receipt.id();

    let before = db.users.get(id).await.unwrap();
    assert_eq!(before.state, RecordState::Dirty);
    assert_eq!(before.confirmed, None);

    receipt.confirm().await.unwrap();

    let after = db.users.get(id).await.unwrap();
    assert_eq!(after.state, RecordState::Clean);
    assert_eq!(after.confirmed.unwrap().name, "ada");
}

#[tokio::test]
async fn cancelled_insert_leaves_no_trace() {
    let db = Database::new();
    let receipt = db.users.insert(user("grace")).await.unwrap();
    let id = receipt.id();
    receipt.cancel(StoreError::NotDirty(id)).await;

    assert!(db.users.get(id).await.is_none());

    // the name is free again
    db.users.insert(user("grace")).await.unwrap();
}

#[tokio::test]
async fn duplicate_unique_key_is_rejected() {
    let db = Database::new();
    db.users.insert(user("ada")).await.unwrap().confirm().await.unwrap();

    let err = db.users.insert(user("ada")).await.unwrap_err();
    assert_eq!(err, StoreError::UniqueViolation);
}

#[tokio::test]
async fn update_rejects_id_change() {
    let db = Database::new();
    let r = db.users.insert(user("ada")).await.unwrap();
    let id = r.id();
    r.confirm().await.unwrap();

    let err = db
        .users
        .update(id, |mut u| {
            u.id = RecordId::new(999);
            u
        })
        .await
        .unwrap_err();
    assert_eq!(err, StoreError::IdChanged);
}

#[tokio::test]
async fn delete_stays_visible_until_confirmed() {
    let db = Database::new();
    let r = db.users.insert(user("ada")).await.unwrap();
    let id = r.id();
    r.confirm().await.unwrap();

    let receipt = db.users.delete(id).await.unwrap();
    let mid = db.users.get(id).await.unwrap();
    assert_eq!(mid.state, RecordState::Dirty);
    assert!(mid.confirmed.is_some());

    receipt.confirm().await.unwrap();
    assert!(db.users.get(id).await.is_none());
}

#[tokio::test]
async fn pending_delete_rejects_a_second_delete_and_any_update() {
    let db = Database::new();
    let r = db.users.insert(user("ada")).await.unwrap();
    let id = r.id();
    r.confirm().await.unwrap();

    let _pending_delete = db.users.delete(id).await.unwrap();

    let err = db.users.delete(id).await.unwrap_err();
    assert_eq!(err, StoreError::Deleted(id));

    let err = db.users.update(id, |u| u).await.unwrap_err();
    assert_eq!(err, StoreError::Deleted(id));
}

#[tokio::test]
async fn get_predicate_skips_uninitialized_records() {
    let db = Database::new();
    let dirty = db.users.insert(user("pending")).await.unwrap();
    db.users.insert(user("confirmed")).await.unwrap().confirm().await.unwrap();

    let all = db.users.get_predicate(|_| true, 0).await;
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].name, "confirmed");

    let dirty_id = dirty.id();
    dirty.cancel(StoreError::NotDirty(dirty_id)).await;
}

#[tokio::test]
async fn snapshot_round_trips_through_restore() {
    let db = Database::new();
    db.users.insert(user("ada")).await.unwrap().confirm().await.unwrap();
    db.next_op();
    let snapshot = db.snapshot().await;

    let restored = Database::new();
    restored.restore(snapshot.clone()).await.unwrap();
    assert_eq!(restored.snapshot().await, snapshot);
}

#[tokio::test]
async fn dropping_a_receipt_without_resolving_cancels_it() {
    let db = Database::new();
    let id = {
        let receipt = db.users.insert(user("temp")).await.unwrap();
        receipt.id()
    };
    // the receipt's Drop spawns a cancellation task; give it a tick to run.
    tokio::task::yield_now().await;
    tokio::task::yield_now().await;
    assert!(db.users.get(id).await.is_none());
}
