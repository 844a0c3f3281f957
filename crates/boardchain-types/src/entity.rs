use crate::RecordId;
use serde::{Deserialize, Serialize};

/// The kind of write a [`Message`] (in the replication sense, not the
/// message-board entity below) carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Op {
    Create,
    Update,
    Delete,
}

/// A relation row that carries its own identity and knows its unique key.
///
/// `UniqueKey` is whatever tuple of fields the relation enforces uniqueness
/// over; relations compare these with `PartialEq` to detect conflicts.
pub trait Entity: Clone + Send + Sync + 'static {
    type UniqueKey: Clone + PartialEq + Eq + std::hash::Hash + Send + Sync;

    fn id(&self) -> RecordId;
    fn set_id(&mut self, id: RecordId);
    fn unique_key(&self) -> Self::UniqueKey;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: RecordId,
    pub name: String,
}

impl Entity for User {
    type UniqueKey = String;

    fn id(&self) -> RecordId {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn unique_key(&self) -> String {
        self.name.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: RecordId,
    pub name: String,
}

impl Entity for Topic {
    type UniqueKey = String;

    fn id(&self) -> RecordId {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn unique_key(&self) -> String {
        self.name.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: RecordId,
    pub topic_id: RecordId,
    pub user_id: RecordId,
    pub text: String,
    /// Unix-epoch milliseconds. Part of the relation's unique key so that
    /// `(topic_id, user_id, created_at)` identifies a single post, matching
    /// the data model in the specification.
    pub created_at: i64,
}

impl Entity for Message {
    type UniqueKey = (RecordId, RecordId, i64);

    fn id(&self) -> RecordId {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn unique_key(&self) -> (RecordId, RecordId, i64) {
        (self.topic_id, self.user_id, self.created_at)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Like {
    pub id: RecordId,
    pub user_id: RecordId,
    pub message_id: RecordId,
}

impl Entity for Like {
    type UniqueKey = (RecordId, RecordId);

    fn id(&self) -> RecordId {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn unique_key(&self) -> (RecordId, RecordId) {
        (self.user_id, self.message_id)
    }
}

/// A replicated payload, tagged by which relation it targets. Carried inside
/// the wire protocol's `Message` frame (see `boardchain-wire`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Payload {
    User(User),
    Topic(Topic),
    Message(Message),
    Like(Like),
}

/// One applied write, published to subscribers once it lands in a node's
/// local store. Unlike [`Payload`] on the wire, this always reflects what a
/// reader would see afterward, since it is only ever raised after the
/// corresponding relation call has succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEvent {
    pub op: Op,
    pub payload: Payload,
}
