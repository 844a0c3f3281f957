use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::instrument;

use boardchain_types::{Entity, RecordId};

use crate::error::StoreError;
use crate::receipt::Receipt;

/// Where a record sits in the optimistic two-phase lifecycle (see the crate
/// docs). `Absent` is never observed directly — it is the state implied by a
/// missing map entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordState {
    Absent,
    Clean,
    Dirty,
}

#[derive(Debug, Clone)]
pub(crate) enum Pending<E> {
    Insert(E),
    Update(E),
    Delete,
}

#[derive(Debug, Clone)]
pub(crate) struct Slot<E> {
    pub(crate) confirmed: Option<E>,
    pub(crate) pending: Option<Pending<E>>,
}

impl<E> Slot<E> {
    fn state(&self) -> RecordState {
        if self.pending.is_some() {
            RecordState::Dirty
        } else {
            RecordState::Clean
        }
    }
}

/// A point-in-time read of one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot<E> {
    pub id: RecordId,
    pub state: RecordState,
    pub confirmed: Option<E>,
}

pub(crate) struct Inner<E: Entity> {
    pub(crate) slots: HashMap<RecordId, Slot<E>>,
    pub(crate) unique_index: HashMap<E::UniqueKey, RecordId>,
    pub(crate) locks: HashMap<RecordId, Arc<Mutex<()>>>,
    pub(crate) next_id: u64,
}

impl<E: Entity> Default for Inner<E> {
    fn default() -> Self {
        Self {
            slots: HashMap::new(),
            unique_index: HashMap::new(),
            locks: HashMap::new(),
            next_id: 1,
        }
    }
}

impl<E: Entity> Inner<E> {
    fn alloc_id(&mut self) -> RecordId {
        let id = RecordId::new(self.next_id);
        self.next_id += 1;
        id
    }

    fn lock_for(&mut self, id: RecordId) -> Arc<Mutex<()>> {
        self.locks.entry(id).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
    }
}

/// A typed relation: a table of `E` rows behind one reader-writer lock, with
/// a unique index over `E::UniqueKey` and per-record mutexes serializing the
/// two-phase `Receipt` lifecycle.
pub struct Relation<E: Entity> {
    inner: Arc<RwLock<Inner<E>>>,
}

impl<E: Entity> Clone for Relation<E> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl<E: Entity> Default for Relation<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> Relation<E> {
    pub fn new() -> Self {
        Self { inner: Arc::new(RwLock::new(Inner::default())) }
    }

    /// Inserts `entity`, assigning it a fresh id. Fails without touching the
    /// unique index if `entity`'s unique key already belongs to another
    /// record.
    #[instrument(skip_all)]
    pub async fn insert(&self, mut entity: E) -> Result<Receipt<E>, StoreError> {
        let mut guard = self.inner.write().await;
        let key = entity.unique_key();
        if guard.unique_index.contains_key(&key) {
            return Err(StoreError::UniqueViolation);
        }
        let id = guard.alloc_id();
        entity.set_id(id);
        guard.unique_index.insert(key, id);
        guard.slots.insert(id, Slot { confirmed: None, pending: Some(Pending::Insert(entity)) });
        let lock = guard.lock_for(id);
        drop(guard);
        let owned = lock.lock_owned().await;
        Ok(Receipt::new(self.inner.clone(), id, owned))
    }

    /// Loads the clean value for `id`, applies `transform`, and stages the
    /// result as a pending update. Rejects a `transform` that changes the
    /// record's id.
    #[instrument(skip_all)]
    pub async fn update(
        &self,
        id: RecordId,
        transform: impl FnOnce(E) -> E,
    ) -> Result<Receipt<E>, StoreError> {
        let mut guard = self.inner.write().await;
        let slot = guard.slots.get(&id).ok_or(StoreError::NotFound(id))?;
        if matches!(slot.pending, Some(Pending::Delete)) {
            return Err(StoreError::Deleted(id));
        }
        let current = match &slot.confirmed {
            Some(value) => value.clone(),
            None => return Err(StoreError::Uninitialized(id)),
        };
        let updated = transform(current);
        if updated.id() != id {
            return Err(StoreError::IdChanged);
        }
        let key = updated.unique_key();
        if let Some(&holder) = guard.unique_index.get(&key) {
            if holder != id {
                return Err(StoreError::UniqueViolation);
            }
        }
        let slot = guard.slots.get_mut(&id).expect("checked above");
        slot.pending = Some(Pending::Update(updated));
        let lock = guard.lock_for(id);
        drop(guard);
        let owned = lock.lock_owned().await;
        Ok(Receipt::new(self.inner.clone(), id, owned))
    }

    /// Marks `id` for deletion. The confirmed value remains visible to
    /// readers until the receipt is confirmed. Fails if a delete for `id`
    /// is already pending, rather than letting a second caller race the
    /// first's confirm/cancel.
    #[instrument(skip_all)]
    pub async fn delete(&self, id: RecordId) -> Result<Receipt<E>, StoreError> {
        let mut guard = self.inner.write().await;
        let slot = guard.slots.get(&id).ok_or(StoreError::NotFound(id))?;
        if matches!(slot.pending, Some(Pending::Delete)) {
            return Err(StoreError::Deleted(id));
        }
        if slot.confirmed.is_none() {
            return Err(StoreError::Uninitialized(id));
        }
        guard.slots.get_mut(&id).expect("checked above").pending = Some(Pending::Delete);
        let lock = guard.lock_for(id);
        drop(guard);
        let owned = lock.lock_owned().await;
        Ok(Receipt::new(self.inner.clone(), id, owned))
    }

    pub async fn get(&self, id: RecordId) -> Option<Snapshot<E>> {
        let guard = self.inner.read().await;
        let slot = guard.slots.get(&id)?;
        Some(Snapshot { id, state: slot.state(), confirmed: slot.confirmed.clone() })
    }

    /// Confirmed values matching `pred`, skipping never-confirmed (pending
    /// insert) records. `limit == 0` means unlimited.
    pub async fn get_predicate(&self, pred: impl Fn(&E) -> bool, limit: usize) -> Vec<E> {
        let guard = self.inner.read().await;
        let mut out = Vec::new();
        for slot in guard.slots.values() {
            let Some(value) = &slot.confirmed else { continue };
            if pred(value) {
                out.push(value.clone());
                if limit != 0 && out.len() >= limit {
                    break;
                }
            }
        }
        out
    }

    pub async fn get_all(&self) -> Vec<E> {
        self.get_predicate(|_| true, 0).await
    }

    pub async fn count(&self) -> usize {
        let guard = self.inner.read().await;
        guard.slots.values().filter(|slot| slot.confirmed.is_some()).count()
    }

    /// Bulk-loads `entities` into an empty relation, confirming every entry
    /// immediately. Used by the handshake's full-transfer step.
    pub async fn import(&self, entities: Vec<E>) -> Result<(), StoreError> {
        let mut guard = self.inner.write().await;
        if !guard.slots.is_empty() {
            return Err(StoreError::NotEmpty);
        }
        let mut max_id = 0u64;
        for entity in entities {
            let id = entity.id();
            max_id = max_id.max(id.get());
            let key = entity.unique_key();
            if guard.unique_index.contains_key(&key) {
                return Err(StoreError::UniqueViolation);
            }
            guard.unique_index.insert(key, id);
            guard.slots.insert(id, Slot { confirmed: Some(entity), pending: None });
        }
        guard.next_id = guard.next_id.max(max_id + 1);
        Ok(())
    }
}

pub(crate) type OwnedGuard = OwnedMutexGuard<()>;
