//! # boardchain
//!
//! A chain-replicated message board. Writes flow head-to-tail down a chain
//! of data nodes ([`ChainNode`]); a Raft-backed control plane
//! ([`ControlPlaneConfig`], [`ChainSupervisor`]) elects a leader, health
//! checks the chain, and keeps it at its target length. Clients talk to a
//! data node's service-addr listener ([`BoardClient`]) for CRUD and
//! subscriptions, and to a control-plane replica ([`RoutingService`]) to
//! find out which node to talk to.
//!
//! This crate re-exports the public surface of the component crates; it
//! carries no logic of its own beyond gluing their names together for
//! downstream consumers who only want one `Cargo.toml` line.

pub use boardchain_client::{BoardClient, BoardMessage, ClusterState, RoutingService, SubscriptionNode};
pub use boardchain_node::{ChainNode, NodeConfig};
pub use boardchain_server::{run, ControlPlaneConfig};
pub use boardchain_supervisor::{ChainSupervisor, SupervisorConfig};
pub use boardchain_types::{Entity, Like, Message, MessageEvent, MessageIndex, NodeDescriptor, NodeId, Op, Payload, RecordId, Topic, User};
pub use boardchain_wire::{BoardRequest, BoardResponse, ControlRequest, ControlResponse, NodeRole};
