use std::sync::atomic::{AtomicI32, Ordering};

use boardchain_types::{Like, Message, Topic, User};

use crate::error::StoreError;
use crate::relation::Relation;
use crate::snapshot::DatabaseSnapshot;

/// The message board's four relations plus the op-counter, behind one
/// facade. Mirrors the teacher's pattern of a top-level struct aggregating
/// per-table stores rather than handing callers four independent handles.
#[derive(Clone)]
pub struct Database {
    pub users: Relation<User>,
    pub topics: Relation<Topic>,
    pub messages: Relation<Message>,
    pub likes: Relation<Like>,
    op_count: std::sync::Arc<AtomicI32>,
}

impl Default for Database {
    fn default() -> Self {
        Self::new()
    }
}

impl Database {
    pub fn new() -> Self {
        Self {
            users: Relation::new(),
            topics: Relation::new(),
            messages: Relation::new(),
            likes: Relation::new(),
            op_count: std::sync::Arc::new(AtomicI32::new(0)),
        }
    }

    /// Next op-counter value, assigned at the chain head and carried
    /// through the handshake snapshot for successor bootstrap.
    pub fn next_op(&self) -> i32 {
        self.op_count.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn op_count(&self) -> i32 {
        self.op_count.load(Ordering::SeqCst)
    }

    pub async fn snapshot(&self) -> DatabaseSnapshot {
        DatabaseSnapshot {
            users: self.users.get_all().await,
            topics: self.topics.get_all().await,
            messages: self.messages.get_all().await,
            likes: self.likes.get_all().await,
            op_count: self.op_count(),
        }
    }

    /// Restores an empty database from a full-transfer snapshot. Fails if
    /// any relation already holds data.
    pub async fn restore(&self, snapshot: DatabaseSnapshot) -> Result<(), StoreError> {
        self.users.import(snapshot.users).await?;
        self.topics.import(snapshot.topics).await?;
        self.messages.import(snapshot.messages).await?;
        self.likes.import(snapshot.likes).await?;
        self.op_count.store(snapshot.op_count, Ordering::SeqCst);
        Ok(())
    }
}
