//! # boardchain-types: core types for boardchain
//!
//! Shared types used across the chain-replication data plane and the
//! consensus-backed control plane:
//! - Record identity ([`RecordId`]) and the message-board entities
//!   ([`User`], [`Topic`], [`Message`], [`Like`])
//! - Chain-position bookkeeping ([`MessageIndex`])
//! - Chain membership descriptors ([`NodeDescriptor`], [`NodeId`])

mod entity;
mod ids;
mod node;

pub use entity::{Entity, Like, Message, MessageEvent, Op, Payload, Topic, User};
pub use ids::{MessageIndex, RecordId};
pub use node::{NodeDescriptor, NodeId};
