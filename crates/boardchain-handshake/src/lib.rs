//! # boardchain-handshake: predecessor-to-successor resync
//!
//! Every new chain attachment runs this four-step protocol before the
//! steady-state replication stream (`boardchain-stream` + the `Replicate`
//! frames in `boardchain-wire`) may carry new writes. The **client** is the
//! upstream node attaching to a successor; the **server** is the downstream
//! node accepting it.
//!
//! This crate knows only the protocol shape. It reaches into the node's
//! actual data (the outbound message log, the confirmation log, the store)
//! through the [`ClientSource`] / [`ServerSource`] traits, which
//! `boardchain-node` implements.

mod channel;
mod client;
mod error;
mod server;

#[cfg(test)]
mod tests;

pub use channel::Channel;
pub use client::{run_client, ClientOutcome, ClientSource};
pub use error::HandshakeError;
pub use server::{run_server, ServerOutcome, ServerSource};

use std::time::Duration;

/// Fixed backoff a caller waits before retrying a failed handshake attempt.
pub const RETRY_BACKOFF: Duration = Duration::from_secs(5);
