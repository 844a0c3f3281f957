//! # boardchain-wire: the binary wire protocol
//!
//! A single length-prefixed framing scheme (see [`Frame`]) carries four
//! distinct message families over plain TCP:
//!
//! - [`HandshakeMessage`] — the four-step predecessor↔successor resync
//!   (§4.5 of the spec).
//! - [`ReplicateMessage`] — the steady-state chain replication stream.
//! - [`ControlRequest`]/[`ControlResponse`] — unary control-plane RPCs
//!   (`Ping`, `SwitchRole`, `SwitchSuccessor`) from the supervisor to a
//!   data node.
//! - [`ClientRequest`]/[`ClientResponse`] — routing lookups from a client
//!   to a control-plane replica.
//! - [`BoardRequest`]/[`BoardResponse`] — message-board CRUD and
//!   subscription RPCs from a client straight to a data node's
//!   service-addr listener.
//!
//! All payloads are `serde`-derived and encoded with `postcard`; framing is
//! a 4-byte big-endian length prefix followed by that many payload bytes,
//! the same shape as the teacher's `Frame`/`FRAME_HEADER_SIZE` convention.

mod board;
mod client;
mod control;
mod frame;
mod handshake;
mod replicate;

pub use board::{BoardRequest, BoardResponse};
pub use client::{ClientRequest, ClientResponse, NodeSummary};
pub use control::{ControlRequest, ControlResponse, NodeRole};
pub use frame::{Frame, FrameError, FRAME_HEADER_SIZE};
pub use handshake::{ClientHello, ClientMissingData, DatabaseSnapshot, HandshakeMessage, ServerHello, ServerMissingData};
pub use replicate::{Confirmation, Message, ReplicateMessage};
