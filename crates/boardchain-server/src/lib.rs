//! # boardchain-server: control-plane process wiring
//!
//! Assembles one control-plane replica: the raft transport listener, the
//! [`ChainFsm`], the leader-only [`ChainSupervisor`] tick, and the `/state`
//! + `/join` HTTP surface ([`http::HttpSidecar`]). `boardchain-cli` parses
//! flags and calls [`run`]; this crate owns the task layout.

mod error;
mod framed;
pub mod http;
mod rpc;

pub use error::{ServerError, ServerResult};

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument};

use boardchain_client::RoutingService;
use boardchain_consensus::{serve, ChainFsm, TcpRaftTransport};
use boardchain_supervisor::{ChainSupervisor, SupervisorConfig};

/// Everything a control-plane binary needs to start one replica. Mirrors
/// the flags in `boardchain-cli`'s control-plane command one-for-one.
pub struct ControlPlaneConfig {
    pub id: u64,
    pub peer_addrs: HashMap<u64, String>,
    pub raft_addr: String,
    pub http_addr: String,
    pub rpc_addr: String,
    pub supervisor: SupervisorConfig,
    /// Where this replica's raft log, hardstate, and snapshots persist
    /// across restarts. Passed straight through to `ChainFsm::spawn`.
    pub data_dir: PathBuf,
}

#[instrument(skip(config))]
pub async fn run(config: ControlPlaneConfig) -> ServerResult<()> {
    let peers: Vec<u64> = config.peer_addrs.keys().copied().chain(std::iter::once(config.id)).collect();
    let transport = Arc::new(TcpRaftTransport::new(config.peer_addrs));

    let fsm = ChainFsm::spawn(config.id, peers, SharedTransport(transport.clone()), config.data_dir.clone())?;

    let raft_listener = tokio::net::TcpListener::bind(&config.raft_addr)
        .await
        .map_err(|source| raft_bind_error(&config.raft_addr, source))?;
    let step_fsm = fsm.clone();
    tokio::spawn(async move {
        let on_message = Arc::new(move |message| {
            let fsm = step_fsm.clone();
            tokio::spawn(async move { fsm.step(message).await });
        });
        if let Err(err) = serve(raft_listener, on_message).await {
            error!(%err, "raft transport listener exited");
        }
    });

    let supervisor = ChainSupervisor::new(fsm.clone(), config.supervisor);
    let cancel = CancellationToken::new();
    let supervisor_cancel = cancel.clone();
    tokio::spawn(async move { supervisor.run(supervisor_cancel).await });

    let routing = RoutingService::new(fsm.clone());
    let rpc_addr = config.rpc_addr.clone();
    tokio::spawn(async move {
        if let Err(err) = rpc::run(routing, &rpc_addr).await {
            error!(%err, "client rpc listener exited");
        }
    });

    info!(id = config.id, %config.raft_addr, %config.http_addr, %config.rpc_addr, "control-plane replica started");
    http::HttpSidecar::new(fsm, transport).run(&config.http_addr).await.map_err(ServerError::Io)
}

fn raft_bind_error(addr: &str, source: std::io::Error) -> ServerError {
    ServerError::BindFailed { addr: addr.parse().unwrap_or_else(|_| "0.0.0.0:0".parse().unwrap()), source }
}

/// Adapts `Arc<TcpRaftTransport>` to `RaftTransport` so `ChainFsm::spawn`
/// can own a transport handle that's also shared with the HTTP sidecar.
struct SharedTransport(Arc<TcpRaftTransport>);

#[async_trait::async_trait]
impl boardchain_consensus::RaftTransport for SharedTransport {
    async fn send(&self, message: raft::prelude::Message) {
        self.0.send(message).await;
    }
}
