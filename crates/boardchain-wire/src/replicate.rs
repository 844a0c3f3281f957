use serde::{Deserialize, Serialize};

use boardchain_replay::Indexed;
use boardchain_types::{MessageIndex, Op, Payload};

/// A single replicated write, flowing downstream from predecessor to
/// successor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub message_index: i32,
    pub request_id: String,
    pub op: Op,
    pub payload: Payload,
}

impl Indexed for Message {
    fn message_index(&self) -> MessageIndex {
        MessageIndex::new(self.message_index)
    }
}

/// The tail's (or a relay's forwarded) acknowledgement, flowing upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confirmation {
    pub message_index: i32,
    pub request_id: String,
    pub ok: bool,
    pub error: String,
}

impl Confirmation {
    pub fn ok(message_index: MessageIndex, request_id: impl Into<String>) -> Self {
        Self {
            message_index: message_index.get(),
            request_id: request_id.into(),
            ok: true,
            error: String::new(),
        }
    }

    pub fn error(message_index: MessageIndex, request_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            message_index: message_index.get(),
            request_id: request_id.into(),
            ok: false,
            error: error.into(),
        }
    }
}

impl Indexed for Confirmation {
    fn message_index(&self) -> MessageIndex {
        MessageIndex::new(self.message_index)
    }
}

/// A frame on the steady-state `Replicate` stream: either a new write
/// heading downstream, or an acknowledgement heading back upstream. The two
/// directions share one framed connection (see `boardchain-stream`) rather
/// than two sockets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ReplicateMessage {
    Message(Message),
    Confirmation(Confirmation),
}
