//! # boardchain-supervisor: leader-only chain health and rewiring
//!
//! Every control-plane node runs a [`ChainSupervisor`], but only the
//! consensus leader's tick does anything: ping the chain, drop dead nodes,
//! rewire roles/successors by position, spawn replacements up to the
//! target chain length, and commit the result as one consensus command.

mod config;
mod error;
mod health;
mod registry;
mod supervisor;

pub use config::SupervisorConfig;
pub use error::{Result, SupervisorError};
pub use health::assign_roles;
pub use supervisor::ChainSupervisor;
