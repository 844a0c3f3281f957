//! # boardchain-store: the in-memory relational store
//!
//! Every write the chain replicates lands here. A [`Relation`] holds typed
//! rows behind a relation-level reader-writer lock, each with a
//! [`RecordState`] of *absent*, *clean*, or *dirty*. Writes go through a
//! [`Receipt`]: the record becomes visible (or disappears, for deletes)
//! only once the receipt is resolved with `confirm()`, modelling "awaiting
//! tail acknowledgement" in the chain-replication protocol.
//!
//! [`Database`] bundles the four message-board relations
//! (`users`/`topics`/`messages`/`likes`) behind one facade and adds
//! `snapshot`/`restore` for the handshake's full-transfer step.

mod database;
mod error;
mod receipt;
mod relation;
mod snapshot;

#[cfg(test)]
mod tests;

pub use database::Database;
pub use error::StoreError;
pub use receipt::Receipt;
pub use relation::{Relation, RecordState, Snapshot};
pub use snapshot::DatabaseSnapshot;
