//! Entry point for one control-plane replica: a raft voter that runs the
//! chain membership FSM, the leader-only supervisor tick, and the
//! `/state` + `/join` + client-routing surfaces.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use boardchain_config::BoardchainConfig;
use boardchain_server::ControlPlaneConfig;
use boardchain_supervisor::SupervisorConfig;

/// Starts a boardchain control-plane replica.
#[derive(Debug, Parser)]
#[command(name = "boardchain-control", version)]
struct Cli {
    /// This replica's raft voter id. Must match one of `--peer`'s ids
    /// across every replica in the cluster.
    #[arg(long)]
    id: u64,

    /// Other voters in the cluster, as repeated `id=host:port` pairs
    /// naming their raft transport address.
    #[arg(long = "peer", value_parser = parse_peer)]
    peers: Vec<(u64, String)>,

    /// Address this replica's raft transport listens on.
    #[arg(long)]
    raft_addr: String,

    /// Address the `/state` and `/join` admin surface listens on.
    #[arg(long)]
    http_addr: String,

    /// Address the client-facing routing RPCs (`GetClusterState`,
    /// `GetSubscriptionNode`) listen on.
    #[arg(long)]
    rpc_addr: String,

    /// Data-node executable the supervisor spawns to grow the chain.
    #[arg(long)]
    data_exec: Option<PathBuf>,

    /// Host spawned data nodes bind their control/ingress/service
    /// listeners on.
    #[arg(long, default_value = "127.0.0.1")]
    node_host: String,

    /// Base port for spawned data nodes; node `n` takes
    /// `base + 3*n`/`+1`/`+2` for control/ingress/service.
    #[arg(long, default_value_t = 9000)]
    node_base_port: u16,

    /// Desired steady-state chain length.
    #[arg(long)]
    target_nodes: Option<usize>,

    /// Directory spawned data nodes are told to write logs under.
    #[arg(long)]
    logs: Option<PathBuf>,

    /// Base directory for this replica's raft log/hardstate/snapshot
    /// persistence. The replica's own state lives under
    /// `<data-dir>/data_<id>/`.
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

fn parse_peer(raw: &str) -> Result<(u64, String), String> {
    let (id, addr) = raw.split_once('=').ok_or_else(|| format!("expected id=addr, got {raw:?}"))?;
    let id: u64 = id.parse().map_err(|_| format!("invalid peer id {id:?}"))?;
    Ok((id, addr.to_string()))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::from_default_env()).init();

    let cli = Cli::parse();
    let file_config = BoardchainConfig::load().context("loading layered configuration")?;
    let control = file_config.control_plane;

    let supervisor = SupervisorConfig {
        data_exec: cli.data_exec.unwrap_or(control.data_exec),
        host: cli.node_host,
        base_port: cli.node_base_port,
        target_node_count: cli.target_nodes.unwrap_or(control.target_nodes),
        tick_interval: Duration::from_millis(control.tick_interval_ms),
        settle: Duration::from_millis(control.settle_ms),
        logs_dir: cli.logs.unwrap_or(control.logs_dir).to_string_lossy().into_owned(),
    };

    let peer_addrs: HashMap<u64, String> = cli.peers.into_iter().collect();

    let data_dir = cli.data_dir.unwrap_or(control.data_dir).join(format!("data_{}", cli.id));

    let config = ControlPlaneConfig {
        id: cli.id,
        peer_addrs,
        raft_addr: cli.raft_addr,
        http_addr: cli.http_addr,
        rpc_addr: cli.rpc_addr,
        supervisor,
        data_dir,
    };

    boardchain_server::run(config).await.context("control-plane replica exited")
}
