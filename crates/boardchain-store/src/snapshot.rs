use boardchain_types::{Like, Message, Topic, User};

/// A full point-in-time export of every relation, used to bootstrap a
/// virgin successor during the handshake's transfer step (see
/// `boardchain-handshake`).
///
/// This is the store's internal representation. `boardchain-wire` defines
/// its own wire-level `DatabaseSnapshot` for the same reason `NodeRole`
/// duplicates `boardchain_dfa::Role`: the wire format stays independent of
/// this crate's in-process layout. `boardchain-node` converts between them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DatabaseSnapshot {
    pub users: Vec<User>,
    pub topics: Vec<Topic>,
    pub messages: Vec<Message>,
    pub likes: Vec<Like>,
    pub op_count: i32,
}
