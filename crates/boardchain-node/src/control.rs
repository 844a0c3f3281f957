use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tracing::{instrument, warn};

use boardchain_dfa::Event;
use boardchain_wire::{ControlRequest, ControlResponse, NodeRole};

use crate::framed::{write_frame, FrameReader};
use crate::node::ChainNode;

/// Serves the unary control RPCs the supervisor issues against a data node:
/// `Ping`, `SwitchRole`, `SwitchSuccessor`. One request per connection,
/// mirroring `boardchain_procmgr::rpc::send_control`'s client side.
#[instrument(skip(node))]
pub async fn run(node: Arc<ChainNode>, control_addr: &str) -> std::io::Result<()> {
    let listener = TcpListener::bind(control_addr).await?;
    loop {
        let (stream, peer) = listener.accept().await?;
        let node = node.clone();
        tokio::spawn(async move {
            if let Err(err) = handle_one(&node, stream).await {
                warn!(%peer, %err, "control connection failed");
            }
        });
    }
}

async fn handle_one(node: &Arc<ChainNode>, stream: TcpStream) -> std::io::Result<()> {
    let (read, mut write) = stream.into_split();
    let mut reader = FrameReader::new(read);
    let request = reader.read_one::<ControlRequest>().await?;
    let response = dispatch(node, request);
    write_frame(&mut write, &response).await
}

fn dispatch(node: &Arc<ChainNode>, request: ControlRequest) -> ControlResponse {
    match request {
        ControlRequest::Ping => ControlResponse::Ok,
        ControlRequest::SwitchRole(role) => match node.apply_dfa_event(to_event(role)) {
            Ok(_) => ControlResponse::Ok,
            Err(err) => ControlResponse::Err(err.to_string()),
        },
        // The actual connect/disconnect happens asynchronously in
        // `successor::run`, which watches this value; the RPC only needs to
        // record the new target before replying.
        ControlRequest::SwitchSuccessor { address } => {
            node.set_desired_successor(if address.is_empty() { None } else { Some(address) });
            ControlResponse::Ok
        }
    }
}

fn to_event(role: NodeRole) -> Event {
    match role {
        NodeRole::Relay => Event::RoleRelay,
        NodeRole::Reader => Event::RoleReader,
        NodeRole::Confirmer => Event::RoleConfirmer,
        NodeRole::ReaderConfirmer => Event::RoleReaderConfirmer,
    }
}
