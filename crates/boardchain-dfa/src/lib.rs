//! # boardchain-dfa: the per-node chain position/role state machine
//!
//! Every chain node tracks two orthogonal facts about itself: its
//! [`Position`] in the chain (is it the head, the tail, somewhere in the
//! middle, or the only node) and its [`Role`] (which sides of the chain it
//! accepts writes from / emits confirmations to). [`NodeState`] pairs them;
//! [`Dfa`] is the pure transition function, and [`DfaDriver`] wraps it with
//! a `tokio::sync::watch` channel so a single role-dispatch task can react
//! to transitions without polling.

mod driver;
mod error;
mod state;
mod transition;

pub use driver::DfaDriver;
pub use error::DfaError;
pub use state::{NodeState, Position, Role};
pub use transition::{Dfa, Event};
