//! Entry point for one chain data node: runs the replicated store, the
//! predecessor/successor stream supervisors, the control-RPC listener the
//! chain supervisor pings, and the client-facing board RPC surface on
//! `--service-addr`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use boardchain_client::{serve, BoardClient};
use boardchain_config::BoardchainConfig;
use boardchain_node::{ChainNode, NodeConfig};
use boardchain_types::NodeId;

/// Starts a boardchain data node.
#[derive(Debug, Parser)]
#[command(name = "boardchain-data-node", version)]
struct Cli {
    /// This node's id, unique within the chain.
    #[arg(long)]
    id: u64,

    /// Address the control-plane supervisor sends `Ping`/`SwitchRole`/
    /// `SwitchSuccessor` RPCs to.
    #[arg(long)]
    control_addr: String,

    /// Address this node's predecessor connects to when resyncing.
    #[arg(long)]
    ingress_addr: String,

    /// Address clients send board CRUD and subscription RPCs to.
    #[arg(long)]
    service_addr: String,

    /// Token a subscribing client must present; minted by the supervisor
    /// at spawn time and handed back to clients via `GetSubscriptionNode`.
    #[arg(long)]
    subscribe_token: String,

    /// Directory this node writes logs under. Defaults to the data-node
    /// section of the layered config file when omitted.
    #[arg(long)]
    logs: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::from_default_env()).init();

    let cli = Cli::parse();
    let file_config = BoardchainConfig::load().context("loading layered configuration")?;
    let logs = cli.logs.unwrap_or(file_config.data_node.logs_dir).to_string_lossy().into_owned();

    let config = NodeConfig {
        id: NodeId::new(cli.id),
        control_addr: cli.control_addr,
        ingress_addr: cli.ingress_addr,
        service_addr: cli.service_addr.clone(),
        subscribe_token: cli.subscribe_token.clone(),
        logs,
    };

    let node = ChainNode::new(config);
    boardchain_node::run(node.clone()).await.context("starting chain node background tasks")?;

    let board = BoardClient::new(node);
    serve(board, &cli.subscribe_token, &cli.service_addr).await.context("board rpc listener exited")
}
