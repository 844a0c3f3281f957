use std::sync::Arc;

use tokio::sync::broadcast;

use boardchain_node::ChainNode;
use boardchain_store::Snapshot;
use boardchain_types::{Like, MessageEvent, Op, Payload, RecordId, Topic, User};
use boardchain_wire::Confirmation;

use crate::error::Result;

/// The message-board entity, to disambiguate from `boardchain_wire::Message`
/// (the replicated write carrying it).
pub type BoardMessage = boardchain_types::Message;

/// Thin translation over `boardchain-node`'s submit/read surface: argument
/// marshalling only, no business logic. Writes go through [`ChainNode::submit`]
/// (replicated if a successor is attached, resolved locally if this node is
/// the whole chain); reads and the subscription stream are served from this
/// node's own local store.
#[derive(Clone)]
pub struct BoardClient {
    node: Arc<ChainNode>,
}

impl BoardClient {
    pub fn new(node: Arc<ChainNode>) -> Self {
        Self { node }
    }

    /// Raw passthrough for callers (the service-addr RPC listener) that
    /// already hold an `Op`/`Payload` pair off the wire, rather than the
    /// per-entity fields the other `create_*`/`update_*` helpers take.
    pub async fn submit(&self, request_id: String, op: Op, payload: Payload) -> Result<Confirmation> {
        Ok(self.node.submit(request_id, op, payload).await?)
    }

    pub async fn create_user(&self, request_id: String, name: String) -> Result<Confirmation> {
        let payload = Payload::User(User { id: RecordId::new(0), name });
        Ok(self.node.submit(request_id, Op::Create, payload).await?)
    }

    pub async fn create_topic(&self, request_id: String, name: String) -> Result<Confirmation> {
        let payload = Payload::Topic(Topic { id: RecordId::new(0), name });
        Ok(self.node.submit(request_id, Op::Create, payload).await?)
    }

    pub async fn create_message(
        &self,
        request_id: String,
        topic_id: RecordId,
        user_id: RecordId,
        text: String,
        created_at: i64,
    ) -> Result<Confirmation> {
        let payload = Payload::Message(BoardMessage { id: RecordId::new(0), topic_id, user_id, text, created_at });
        Ok(self.node.submit(request_id, Op::Create, payload).await?)
    }

    pub async fn create_like(&self, request_id: String, user_id: RecordId, message_id: RecordId) -> Result<Confirmation> {
        let payload = Payload::Like(Like { id: RecordId::new(0), user_id, message_id });
        Ok(self.node.submit(request_id, Op::Create, payload).await?)
    }

    pub async fn update_user(&self, request_id: String, id: RecordId, name: String) -> Result<Confirmation> {
        let payload = Payload::User(User { id, name });
        Ok(self.node.submit(request_id, Op::Update, payload).await?)
    }

    pub async fn update_topic(&self, request_id: String, id: RecordId, name: String) -> Result<Confirmation> {
        let payload = Payload::Topic(Topic { id, name });
        Ok(self.node.submit(request_id, Op::Update, payload).await?)
    }

    pub async fn update_message(
        &self,
        request_id: String,
        id: RecordId,
        topic_id: RecordId,
        user_id: RecordId,
        text: String,
        created_at: i64,
    ) -> Result<Confirmation> {
        let payload = Payload::Message(BoardMessage { id, topic_id, user_id, text, created_at });
        Ok(self.node.submit(request_id, Op::Update, payload).await?)
    }

    pub async fn delete_user(&self, request_id: String, id: RecordId) -> Result<Confirmation> {
        self.delete(request_id, Payload::User(User { id, name: String::new() })).await
    }

    pub async fn delete_topic(&self, request_id: String, id: RecordId) -> Result<Confirmation> {
        self.delete(request_id, Payload::Topic(Topic { id, name: String::new() })).await
    }

    pub async fn delete_message(&self, request_id: String, id: RecordId) -> Result<Confirmation> {
        let placeholder =
            BoardMessage { id, topic_id: RecordId::new(0), user_id: RecordId::new(0), text: String::new(), created_at: 0 };
        self.delete(request_id, Payload::Message(placeholder)).await
    }

    pub async fn delete_like(&self, request_id: String, id: RecordId) -> Result<Confirmation> {
        self.delete(request_id, Payload::Like(Like { id, user_id: RecordId::new(0), message_id: RecordId::new(0) }))
            .await
    }

    /// A delete only ever reads `payload`'s id (see
    /// `boardchain_node::intercept::apply`); every other field is an unused
    /// placeholder.
    async fn delete(&self, request_id: String, payload: Payload) -> Result<Confirmation> {
        Ok(self.node.submit(request_id, Op::Delete, payload).await?)
    }

    pub async fn list_users(&self) -> Vec<User> {
        self.node.db().users.get_all().await
    }

    pub async fn list_topics(&self) -> Vec<Topic> {
        self.node.db().topics.get_all().await
    }

    /// `limit == 0` means no limit.
    pub async fn list_messages_in_topic(&self, topic_id: RecordId, limit: usize) -> Vec<BoardMessage> {
        self.node.db().messages.get_predicate(|m| m.topic_id == topic_id, limit).await
    }

    pub async fn list_likes_for_message(&self, message_id: RecordId) -> Vec<Like> {
        self.node.db().likes.get_predicate(|like| like.message_id == message_id, 0).await
    }

    pub async fn get_user(&self, id: RecordId) -> Option<Snapshot<User>> {
        self.node.db().users.get(id).await
    }

    pub async fn get_topic(&self, id: RecordId) -> Option<Snapshot<Topic>> {
        self.node.db().topics.get(id).await
    }

    pub async fn get_message(&self, id: RecordId) -> Option<Snapshot<BoardMessage>> {
        self.node.db().messages.get(id).await
    }

    /// Server-streaming subscription over every write this node applies
    /// locally, authenticated upstream by the caller checking the
    /// subscriber's token against the `subscribe_token` this node was
    /// assigned (see `boardchain-client::routing`).
    pub fn subscribe(&self) -> broadcast::Receiver<MessageEvent> {
        self.node.subscribe_events()
    }
}
