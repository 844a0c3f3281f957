use boardchain_consensus::{ChainFsm, Command};
use boardchain_crypto::mint_subscribe_token;
use boardchain_procmgr::{send_control, DataNodeProcess, SpawnConfig, POST_SPAWN_SETTLE};
use boardchain_types::{NodeDescriptor, NodeId};
use boardchain_wire::{ControlRequest, ControlResponse};
use tokio::time::{interval, sleep};
use tracing::{error, info, instrument, warn};

use crate::config::SupervisorConfig;
use crate::health::assign_roles;
use crate::registry::ProcessRegistry;
use crate::Result;

/// Drives `runHealthCheck` on a 2-second tick, acting only while this node
/// is the consensus leader. Followers still hold a `ChainSupervisor` (so
/// they're ready to take over instantly on election) but their ticks are
/// no-ops.
pub struct ChainSupervisor {
    fsm: ChainFsm,
    config: SupervisorConfig,
    registry: ProcessRegistry,
}

impl ChainSupervisor {
    pub fn new(fsm: ChainFsm, config: SupervisorConfig) -> Self {
        Self { fsm, config, registry: ProcessRegistry::default() }
    }

    /// Runs the tick loop until cancelled. Intended to be spawned once per
    /// control-plane process alongside the consensus node and the HTTP
    /// control surface.
    pub async fn run(&self, cancel: tokio_util::sync::CancellationToken) {
        let mut ticker = interval(self.config.tick_interval);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("chain supervisor stopping");
                    return;
                }
                _ = ticker.tick() => {
                    if !self.fsm.is_leader() {
                        continue;
                    }
                    if let Err(err) = self.run_health_check().await {
                        error!(%err, "health check tick failed");
                    }
                }
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn run_health_check(&self) -> Result<()> {
        let state = self.fsm.current_state();
        let mut counter = state.counter;

        let pings = ping_all(&state.nodes).await;
        let mut survivors = Vec::new();
        for (node, alive) in state.nodes.into_iter().zip(pings) {
            if alive {
                survivors.push(node);
            } else {
                warn!(node_id = %node.id, "data node failed its health check, removing");
                self.registry.terminate(node.id).await;
            }
        }

        if survivors.is_empty() {
            panic!("chain shrank to zero live nodes; cannot recover supervision without a seed node");
        }

        self.rewire(&survivors).await;

        while survivors.len() < self.config.target_node_count {
            let id = NodeId::new(counter);
            counter += 1;
            let descriptor = self.spawn_one(id).await?;
            survivors.push(descriptor);
            self.rewire(&survivors).await;
        }

        self.fsm.propose(Command::FullChainReplace { nodes: survivors, counter }).await?;
        Ok(())
    }

    async fn rewire(&self, nodes: &[NodeDescriptor]) {
        for (node, (role, successor)) in nodes.iter().zip(assign_roles(nodes)) {
            match send_control(&node.control_addr, ControlRequest::SwitchRole(role)).await {
                Ok(ControlResponse::Ok) => {}
                Ok(ControlResponse::Err(msg)) => warn!(node_id = %node.id, msg, "node rejected role switch"),
                Err(err) => warn!(node_id = %node.id, %err, "role switch RPC failed"),
            }
            sleep(self.config.settle).await;

            match send_control(&node.control_addr, ControlRequest::SwitchSuccessor { address: successor }).await {
                Ok(ControlResponse::Ok) => {}
                Ok(ControlResponse::Err(msg)) => warn!(node_id = %node.id, msg, "node rejected successor switch"),
                Err(err) => warn!(node_id = %node.id, %err, "successor switch RPC failed"),
            }
            sleep(self.config.settle).await;
        }
    }

    async fn spawn_one(&self, id: NodeId) -> Result<NodeDescriptor> {
        let (control_addr, ingress_addr, service_addr) = self.config.derive_addrs(id.get());
        let subscribe_token = mint_subscribe_token();
        let spawn = SpawnConfig {
            id,
            exec: self.config.data_exec.clone(),
            control_addr,
            ingress_addr,
            service_addr,
            subscribe_token,
            logs: self.config.logs_dir.clone(),
        };
        let process = DataNodeProcess::start(spawn)?;
        let descriptor = process.descriptor().clone();
        self.registry.insert(process).await;
        sleep(POST_SPAWN_SETTLE).await;
        Ok(descriptor)
    }
}

async fn ping_all(nodes: &[NodeDescriptor]) -> Vec<bool> {
    let pings = nodes.iter().map(|node| async move {
        send_control(&node.control_addr, ControlRequest::Ping).await.map(|r| matches!(r, ControlResponse::Ok)).unwrap_or(false)
    });
    futures::future::join_all(pings).await
}
