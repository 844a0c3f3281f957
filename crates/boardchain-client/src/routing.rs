use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use boardchain_consensus::ChainFsm;
use boardchain_types::NodeDescriptor;

use crate::error::{ClientError, Result};

/// Head and tail of the current chain: writes go to `head`, strongly
/// consistent reads go to `tail`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterState {
    pub head: NodeDescriptor,
    pub tail: NodeDescriptor,
}

/// A node picked to serve one subscriber, plus the secret it must present
/// on the subscription stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionNode {
    pub node: NodeDescriptor,
    pub subscribe_token: String,
}

/// Answers `GetClusterState`/`GetSubscriptionNode` from the consensus FSM's
/// latest applied chain description. Carries no state of its own beyond the
/// `ChainFsm` handle; every answer is a pure read of the current snapshot.
#[derive(Clone)]
pub struct RoutingService {
    fsm: ChainFsm,
}

impl RoutingService {
    pub fn new(fsm: ChainFsm) -> Self {
        Self { fsm }
    }

    pub fn cluster_state(&self) -> Result<ClusterState> {
        let state = self.fsm.current_state();
        let head = state.head().cloned().ok_or(ClientError::ClusterNotReady)?;
        let tail = state.tail().cloned().ok_or(ClientError::ClusterNotReady)?;
        Ok(ClusterState { head, tail })
    }

    /// Routes a subscriber to a mid node, deterministically by `(user_id,
    /// topics)` so repeated subscriptions from the same subscriber land on
    /// the same node rather than scattering across the chain on every
    /// reconnect.
    pub fn subscription_node(&self, user_id: u64, topics: &[String]) -> Result<SubscriptionNode> {
        let state = self.fsm.current_state();
        if state.nodes.is_empty() {
            return Err(ClientError::ClusterNotReady);
        }
        let mut hasher = DefaultHasher::new();
        user_id.hash(&mut hasher);
        topics.hash(&mut hasher);
        let pick = hasher.finish() as usize;
        let node = state.mid(pick).cloned().expect("checked non-empty above");
        let subscribe_token = node.subscribe_token.clone();
        Ok(SubscriptionNode { node, subscribe_token })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use boardchain_consensus::Command;
    use boardchain_types::NodeId;
    use raft::prelude::Message as RaftMessage;

    struct NoopTransport;

    #[async_trait]
    impl boardchain_consensus::RaftTransport for NoopTransport {
        async fn send(&self, _message: RaftMessage) {}
    }

    fn descriptor(id: u64) -> NodeDescriptor {
        NodeDescriptor::new(
            NodeId::new(id),
            format!("127.0.0.1:{id}"),
            format!("127.0.0.1:{}", id + 1),
            format!("127.0.0.1:{}", id + 2),
            format!("token-{id}"),
        )
    }

    async fn single_node_fsm() -> ChainFsm {
        let fsm = ChainFsm::spawn(1, vec![1], NoopTransport).unwrap();
        for _ in 0..200 {
            if fsm.is_leader() {
                return fsm;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        panic!("single-voter cluster never became leader");
    }

    #[tokio::test]
    async fn cluster_not_ready_before_any_chain_is_committed() {
        let fsm = single_node_fsm().await;
        let routing = RoutingService::new(fsm);
        assert!(matches!(routing.cluster_state(), Err(ClientError::ClusterNotReady)));
        assert!(matches!(routing.subscription_node(1, &[]), Err(ClientError::ClusterNotReady)));
    }

    #[tokio::test]
    async fn reports_head_tail_and_a_stable_subscription_node() {
        let fsm = single_node_fsm().await;
        let nodes = vec![descriptor(1), descriptor(2), descriptor(3)];
        fsm.propose(Command::FullChainReplace { nodes: nodes.clone(), counter: 3 }).await.unwrap();

        let routing = RoutingService::new(fsm);
        let cluster = routing.cluster_state().unwrap();
        assert_eq!(cluster.head.id, NodeId::new(1));
        assert_eq!(cluster.tail.id, NodeId::new(3));

        let topics = vec!["general".to_string()];
        let first = routing.subscription_node(42, &topics).unwrap();
        let second = routing.subscription_node(42, &topics).unwrap();
        assert_eq!(first, second);
    }
}
