//! # boardchain-consensus: the chain membership FSM
//!
//! Wraps `tikv`'s `raft` crate as an **opaque replicated log**: callers see
//! a leader-election signal ([`ChainFsm::is_leader`]), a propose/apply
//! cycle ([`ChainFsm::propose`] / [`ChainFsm::current_state`]), and
//! snapshot install/restore performed internally on raft's own schedule.
//! Nothing above this crate touches raft's wire format, log storage, or
//! election internals directly.

mod error;
mod fsm;
mod log;
mod state;
mod transport;

pub use error::{ConsensusError, Result};
pub use fsm::ChainFsm;
pub use state::{ChainState, Command};
pub use transport::{serve, RaftTransport, TcpRaftTransport};
