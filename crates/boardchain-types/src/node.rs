use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// Identity of a data node, assigned by the chain supervisor's spawn
/// counter (see `boardchain-consensus`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(u64);

impl NodeId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node-{}", self.0)
    }
}

/// Everything the control plane knows about one data node: its three
/// listen addresses, the token subscribers must present to stream its
/// topics, and whether the last health check saw it alive.
///
/// `NodeDescriptor`s are created by the chain supervisor (C9), committed
/// through consensus (C8), and destroyed only by a supervisor-issued
/// removal once the node has failed health checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDescriptor {
    pub id: NodeId,
    /// Address the control plane pings and issues role/successor RPCs to.
    pub control_addr: String,
    /// Address predecessor/successor chain nodes connect to for the
    /// `Handshake`/`Replicate` streams.
    pub ingress_addr: String,
    /// Address clients use for the message-board RPCs and subscriptions.
    pub service_addr: String,
    /// Secret subscribers must present on `GetSubscriptionNode` streams
    /// routed to this node.
    pub subscribe_token: String,
    /// Result of the most recent health check; not itself consensus state
    /// in the sense of being independently replicated, but carried as part
    /// of the committed descriptor because the supervisor always commits a
    /// `{nodes, counter}` pair that already reflects liveness.
    pub alive: bool,
}

impl NodeDescriptor {
    pub fn new(
        id: NodeId,
        control_addr: impl Into<String>,
        ingress_addr: impl Into<String>,
        service_addr: impl Into<String>,
        subscribe_token: impl Into<String>,
    ) -> Self {
        Self {
            id,
            control_addr: control_addr.into(),
            ingress_addr: ingress_addr.into(),
            service_addr: service_addr.into(),
            subscribe_token: subscribe_token.into(),
            alive: true,
        }
    }
}
