use serde::{Deserialize, Serialize};

/// The four DFA roles, as named on the wire (mirrors
/// `boardchain_dfa::Role`; this crate doesn't depend on `boardchain-dfa`
/// to keep the wire format independent of the in-process state machine's
/// representation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeRole {
    Relay,
    Reader,
    Confirmer,
    ReaderConfirmer,
}

/// Unary control-plane RPCs issued by the supervisor to a data node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlRequest {
    Ping,
    SwitchRole(NodeRole),
    /// Empty address means "disconnect the current successor".
    SwitchSuccessor { address: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlResponse {
    Ok,
    Err(String),
}
