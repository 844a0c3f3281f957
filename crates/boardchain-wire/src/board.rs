use serde::{Deserialize, Serialize};

use boardchain_types::{Like, Message, MessageEvent, Op, Payload, RecordId, Topic, User};

use crate::replicate::Confirmation;

/// The message-board RPCs a data node's service-addr listener answers.
/// Writes reuse `Op`/`Payload` directly rather than one bespoke variant
/// per entity, since every write already funnels through
/// `ChainNode::submit(request_id, op, payload)` on the server side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BoardRequest {
    Submit { request_id: String, op: Op, payload: Payload },
    ListUsers,
    ListTopics,
    ListMessagesInTopic { topic_id: RecordId, limit: usize },
    ListLikesForMessage { message_id: RecordId },
    /// Switches the connection into server-streaming mode: every
    /// subsequent frame the server sends is a `BoardResponse::Event`
    /// until the client disconnects. Rejected unless `subscribe_token`
    /// matches the node's configured token.
    Subscribe { subscribe_token: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BoardResponse {
    Confirmation(Confirmation),
    Users(Vec<User>),
    Topics(Vec<Topic>),
    Messages(Vec<Message>),
    Likes(Vec<Like>),
    Event(MessageEvent),
    Err(String),
}
