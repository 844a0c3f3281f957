//! # boardchain-stream: the stream supervisor
//!
//! A chain node talks to its predecessor and its successor over two
//! independent duplex connections. This crate owns the mechanical part of
//! that: pumping a bounded outbound queue into the wire and the wire's
//! inbound frames into a bounded queue, with cooperative cancellation the
//! moment either direction fails. Everything protocol-specific (framing,
//! handshake, replication semantics) lives above this crate.

mod cause;
mod duplex;
mod supervisor;

pub use cause::Cause;
pub use duplex::{Sink, Source};
pub use supervisor::{run, DroppedMessage, Outcome};
