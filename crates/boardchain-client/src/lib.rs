//! # boardchain-client: client-facing routing and board CRUD
//!
//! Answers `GetClusterState`/`GetSubscriptionNode` from the consensus FSM
//! ([`RoutingService`]) and exposes the thin message-board translation layer
//! ([`BoardClient`]) over a running [`boardchain_node::ChainNode`]. Neither
//! type holds any business logic of its own; both marshal arguments to the
//! crates that do.

mod board;
mod error;
mod framed;
mod routing;
mod serve;

pub use board::{BoardClient, BoardMessage};
pub use error::{ClientError, Result};
pub use routing::{ClusterState, RoutingService, SubscriptionNode};
pub use serve::serve;
