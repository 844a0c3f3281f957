//! # boardchain-test-harness: in-process chain fixtures
//!
//! Spins up real [`boardchain_node::ChainNode`]s in-process (no child
//! processes, no consensus layer) and wires them into a chain the same
//! way `boardchain-supervisor`'s tick does: `SwitchRole` then
//! `SwitchSuccessor` per node, derived from
//! [`boardchain_supervisor::assign_roles`]. End-to-end scenario tests
//! build a [`BoardHarness`] instead of hand-rolling socket wiring.

mod error;
mod port;

pub use error::{HarnessError, Result};
pub use port::free_port;

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;

use boardchain_client::BoardClient;
use boardchain_node::{ChainNode, NodeConfig};
use boardchain_procmgr::send_control;
use boardchain_supervisor::assign_roles;
use boardchain_types::{NodeDescriptor, NodeId};
use boardchain_wire::{ControlRequest, ControlResponse};

/// Pause observed after issuing a control RPC, giving the DFA event and
/// (for `SwitchSuccessor`) the successor connect attempt time to land
/// before the next RPC or assertion runs.
pub const SETTLE: Duration = Duration::from_millis(30);

/// One running in-process data node plus the handles a test needs against
/// it: its board client and its advertised descriptor.
pub struct NodeHandle {
    pub descriptor: NodeDescriptor,
    pub node: Arc<ChainNode>,
    pub board: BoardClient,
}

/// Builds and wires a chain of in-process data nodes for a single test.
#[derive(Default)]
pub struct BoardHarness;

impl BoardHarness {
    /// Starts `len` data nodes on `127.0.0.1` at freshly allocated ports
    /// and wires them head-to-tail via the same `SwitchRole`/
    /// `SwitchSuccessor` sequence the chain supervisor issues, using
    /// [`assign_roles`] to derive each node's role and successor.
    pub async fn spawn_chain(len: usize, logs_dir: &std::path::Path) -> Result<Vec<NodeHandle>> {
        let mut handles = Vec::with_capacity(len);
        for i in 0..len {
            handles.push(Self::spawn_one(i as u64 + 1, logs_dir).await?);
        }

        let descriptors: Vec<NodeDescriptor> = handles.iter().map(|h| h.descriptor.clone()).collect();
        for (handle, (role, successor)) in handles.iter().zip(assign_roles(&descriptors)) {
            match send_control(&handle.descriptor.control_addr, ControlRequest::SwitchRole(role)).await? {
                ControlResponse::Ok => {}
                ControlResponse::Err(msg) => return Err(HarnessError::Rejected(msg)),
            }
            sleep(SETTLE).await;

            match send_control(&handle.descriptor.control_addr, ControlRequest::SwitchSuccessor { address: successor })
                .await?
            {
                ControlResponse::Ok => {}
                ControlResponse::Err(msg) => return Err(HarnessError::Rejected(msg)),
            }
            sleep(SETTLE).await;
        }

        Ok(handles)
    }

    async fn spawn_one(id: u64, logs_dir: &std::path::Path) -> Result<NodeHandle> {
        let control_addr = format!("127.0.0.1:{}", free_port()?);
        let ingress_addr = format!("127.0.0.1:{}", free_port()?);
        let service_addr = format!("127.0.0.1:{}", free_port()?);
        let subscribe_token = format!("token-{id}");

        let descriptor = NodeDescriptor::new(
            NodeId::new(id),
            control_addr.clone(),
            ingress_addr.clone(),
            service_addr.clone(),
            subscribe_token.clone(),
        );

        let config = NodeConfig {
            id: NodeId::new(id),
            control_addr,
            ingress_addr,
            service_addr,
            subscribe_token,
            logs: logs_dir.to_string_lossy().into_owned(),
        };

        let node = ChainNode::new(config);
        boardchain_node::run(node.clone()).await?;
        // The control and predecessor listeners bind inside spawned tasks;
        // give them a moment to come up before any RPC targets them.
        sleep(SETTLE).await;

        let board = BoardClient::new(node.clone());
        Ok(NodeHandle { descriptor, node, board })
    }
}
