//! The control-plane replica's client-facing routing RPC: `GetClusterState`
//! and `GetSubscriptionNode`, framed over `boardchain-wire` the same way
//! `boardchain-node`'s control link is.

use tokio::net::{TcpListener, TcpStream};
use tracing::{instrument, warn};

use boardchain_client::{ClientError, RoutingService};
use boardchain_wire::{ClientRequest, ClientResponse, NodeSummary};

use crate::framed::{write_frame, FrameReader};

#[instrument(skip(routing))]
pub async fn run(routing: RoutingService, addr: &str) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    loop {
        let (stream, peer) = listener.accept().await?;
        let routing = routing.clone();
        tokio::spawn(async move {
            if let Err(err) = handle_one(&routing, stream).await {
                warn!(%peer, %err, "client rpc connection failed");
            }
        });
    }
}

async fn handle_one(routing: &RoutingService, stream: TcpStream) -> std::io::Result<()> {
    let (read, mut write) = stream.into_split();
    let mut reader = FrameReader::new(read);
    let request = reader.read_one::<ClientRequest>().await?;
    let response = dispatch(routing, request);
    write_frame(&mut write, &response).await
}

fn dispatch(routing: &RoutingService, request: ClientRequest) -> ClientResponse {
    match request {
        ClientRequest::GetClusterState => match routing.cluster_state() {
            Ok(state) => ClientResponse::ClusterState {
                head: NodeSummary { service_addr: state.head.service_addr },
                tail: NodeSummary { service_addr: state.tail.service_addr },
            },
            Err(ClientError::ClusterNotReady) => ClientResponse::ClusterNotReady,
            Err(err) => {
                warn!(%err, "unexpected routing error answering GetClusterState");
                ClientResponse::ClusterNotReady
            }
        },
        ClientRequest::GetSubscriptionNode { user_id, topics } => match routing.subscription_node(user_id, &topics) {
            Ok(picked) => ClientResponse::SubscriptionNode {
                node: NodeSummary { service_addr: picked.node.service_addr },
                subscribe_token: picked.subscribe_token,
            },
            Err(ClientError::ClusterNotReady) => ClientResponse::ClusterNotReady,
            Err(err) => {
                warn!(%err, "unexpected routing error answering GetSubscriptionNode");
                ClientResponse::ClusterNotReady
            }
        },
    }
}
