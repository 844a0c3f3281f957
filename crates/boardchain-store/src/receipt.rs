use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::warn;

use boardchain_types::{Entity, RecordId};

use crate::error::StoreError;
use crate::relation::{Inner, OwnedGuard, Pending};

/// A pending write, returned by `Relation::insert/update/delete`. Exactly
/// one of [`Receipt::confirm`] or [`Receipt::cancel`] must be called to
/// resolve it — modelling "awaiting tail acknowledgement" in the
/// chain-replication protocol. A receipt dropped without resolution is
/// cancelled automatically.
pub struct Receipt<E: Entity> {
    inner: Option<Arc<RwLock<Inner<E>>>>,
    id: RecordId,
    guard: Option<OwnedGuard>,
}

impl<E: Entity> Receipt<E> {
    pub(crate) fn new(inner: Arc<RwLock<Inner<E>>>, id: RecordId, guard: OwnedGuard) -> Self {
        Self { inner: Some(inner), id, guard: Some(guard) }
    }

    pub fn id(&self) -> RecordId {
        self.id
    }

    /// Commits the pending value into the confirmed slot. For inserts and
    /// updates this atomically replaces the unique-index entry; a conflict
    /// there rolls the receipt back and returns `UniqueViolation`.
    pub async fn confirm(mut self) -> Result<(), StoreError> {
        let inner = self.inner.take().expect("a receipt is resolved at most once");
        let id = self.id;
        let result = {
            let mut guard = inner.write().await;
            apply_confirm(&mut guard, id)
        };
        self.guard.take();
        result
    }

    /// Rolls back the pending value. For a never-confirmed insert this
    /// removes the record and its unique-index reservation entirely.
    pub async fn cancel(mut self, _reason: StoreError) {
        let inner = self.inner.take().expect("a receipt is resolved at most once");
        let id = self.id;
        {
            let mut guard = inner.write().await;
            apply_cancel(&mut guard, id);
        }
        self.guard.take();
    }
}

impl<E: Entity> std::fmt::Debug for Receipt<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Receipt").field("id", &self.id).finish()
    }
}

impl<E: Entity> Drop for Receipt<E> {
    fn drop(&mut self) {
        let Some(inner) = self.inner.take() else { return };
        let id = self.id;
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    let mut guard = inner.write().await;
                    apply_cancel(&mut guard, id);
                });
            }
            Err(_) => warn!(record_id = %id, "receipt dropped outside a tokio runtime, leaving record dirty"),
        }
    }
}

fn apply_confirm<E: Entity>(guard: &mut Inner<E>, id: RecordId) -> Result<(), StoreError> {
    let pending = match guard.slots.get(&id) {
        Some(slot) => slot.pending.clone(),
        None => return Err(StoreError::NotFound(id)),
    };
    match pending {
        Some(Pending::Insert(value)) | Some(Pending::Update(value)) => {
            let new_key = value.unique_key();
            if let Some(&holder) = guard.unique_index.get(&new_key) {
                if holder != id {
                    return Err(StoreError::UniqueViolation);
                }
            }
            if let Some(old_key) =
                guard.slots[&id].confirmed.as_ref().map(Entity::unique_key).filter(|k| *k != new_key)
            {
                guard.unique_index.remove(&old_key);
            }
            guard.unique_index.insert(new_key, id);
            let slot = guard.slots.get_mut(&id).expect("checked above");
            slot.confirmed = Some(value);
            slot.pending = None;
            Ok(())
        }
        Some(Pending::Delete) => {
            if let Some(key) = guard.slots[&id].confirmed.as_ref().map(Entity::unique_key) {
                guard.unique_index.remove(&key);
            }
            guard.slots.remove(&id);
            guard.locks.remove(&id);
            Ok(())
        }
        None => Err(StoreError::NotDirty(id)),
    }
}

fn apply_cancel<E: Entity>(guard: &mut Inner<E>, id: RecordId) {
    let Some(slot) = guard.slots.get(&id) else { return };
    match &slot.pending {
        Some(Pending::Insert(value)) if slot.confirmed.is_none() => {
            let key = value.unique_key();
            guard.unique_index.remove(&key);
            guard.slots.remove(&id);
            guard.locks.remove(&id);
        }
        Some(Pending::Insert(_)) | Some(Pending::Update(_)) | Some(Pending::Delete) => {
            guard.slots.get_mut(&id).expect("checked above").pending = None;
        }
        None => {}
    }
}
