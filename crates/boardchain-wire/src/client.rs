use serde::{Deserialize, Serialize};

/// Client-facing RPCs answered by a control-plane replica's rpc-addr
/// listener: routing lookups only, never board data itself (that's the
/// `BoardClient` surface a data node's service-addr hosts directly).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClientRequest {
    GetClusterState,
    GetSubscriptionNode { user_id: u64, topics: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClientResponse {
    ClusterState { head: NodeSummary, tail: NodeSummary },
    SubscriptionNode { node: NodeSummary, subscribe_token: String },
    ClusterNotReady,
}

/// The subset of `boardchain_types::NodeDescriptor` a client needs to
/// reach a node directly, named independently so this crate doesn't grow
/// a dependency edge back onto `boardchain-types`' consensus-facing type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSummary {
    pub service_addr: String,
}
