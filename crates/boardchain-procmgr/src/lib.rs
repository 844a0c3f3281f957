//! # boardchain-procmgr: out-of-process data-node supervision
//!
//! Spawns data-node executables as child processes and issues the
//! control-plane RPCs (`Ping`, `SwitchRole`, `SwitchSuccessor`) against
//! them. `boardchain-supervisor` (C9) owns chain-wide policy; this crate
//! only knows how to start one process and talk to it.

pub mod config;
pub mod error;
pub mod node;
pub mod rpc;

pub use config::SpawnConfig;
pub use error::{ProcMgrError, Result};
pub use node::{DataNodeProcess, POST_SPAWN_SETTLE};
pub use rpc::{send_control, CONTROL_RPC_DEADLINE};
