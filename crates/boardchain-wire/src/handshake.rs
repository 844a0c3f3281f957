use serde::{Deserialize, Serialize};

use boardchain_types::{Like, Message as MessageEntity, Topic, User};

use crate::replicate::{Confirmation, Message};

/// Step 1: the highest confirmation index the upstream (client) node has
/// observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientHello {
    pub last_confirmation_index: i32,
}

/// Step 2: the tail of the downstream (server) node's message log.
/// `request_transfer` is true iff the server's log is empty, i.e. this is
/// a virgin successor that needs a full database transfer rather than a
/// replay of recent messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerHello {
    pub last_message_index: i32,
    pub request_transfer: bool,
}

/// A full point-in-time copy of every relation, sent when the successor's
/// log was empty and it cannot be caught up by replaying messages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSnapshot {
    pub users: Vec<User>,
    pub topics: Vec<Topic>,
    pub messages: Vec<MessageEntity>,
    pub likes: Vec<Like>,
    pub op_count: i32,
}

/// Step 3: what the client sends once it knows whether a transfer is
/// needed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClientMissingData {
    Transfer(DatabaseSnapshot),
    Sync { messages: Vec<Message> },
}

/// Step 4: confirmations the server owes the client, omitted entirely when
/// a transfer was requested (a virgin successor has nothing outstanding to
/// confirm).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerMissingData {
    pub confirmations: Vec<Confirmation>,
}

/// One frame of the four-step handshake, tagged so both sides can assert
/// they're reading the step they expect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HandshakeMessage {
    ClientHello(ClientHello),
    ServerHello(ServerHello),
    ClientMissingData(ClientMissingData),
    ServerMissingData(ServerMissingData),
}
