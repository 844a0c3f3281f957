//! # boardchain-node: chain node orchestration
//!
//! Wires the store, the outbound/confirmation replay buffers, the
//! position/role DFA, and the predecessor/successor stream supervisors
//! into one running data-node process. [`ChainNode`] holds the shared
//! state; `control`, `predecessor`, and `successor` are the three
//! background tasks [`run`] spawns to drive it, and `source` implements
//! the handshake traits `boardchain-handshake` needs to resync an
//! attachment against it.

mod config;
mod control;
mod error;
mod framed;
mod intercept;
mod node;
mod predecessor;
mod source;
mod successor;
mod transport;

pub use config::NodeConfig;
pub use error::{NodeError, Result};
pub use node::ChainNode;

use std::sync::Arc;

use tracing::{error, instrument};

/// Spawns the control-RPC server, the predecessor accept loop, and the
/// successor connector for `node`, then returns. All three run for the
/// remaining lifetime of the process.
#[instrument(skip(node))]
pub async fn run(node: Arc<ChainNode>) -> Result<()> {
    let control_addr = node.config().control_addr.clone();
    let ingress_addr = node.config().ingress_addr.clone();

    let control_node = node.clone();
    tokio::spawn(async move {
        if let Err(err) = control::run(control_node, &control_addr).await {
            error!(%err, "control server exited");
        }
    });

    let predecessor_node = node.clone();
    tokio::spawn(async move {
        if let Err(err) = predecessor::run(predecessor_node, &ingress_addr).await {
            error!(%err, "predecessor accept loop exited");
        }
    });

    tokio::spawn(successor::run(node));

    Ok(())
}
