use serde::{Deserialize, Serialize};

use boardchain_types::NodeDescriptor;

/// The chain membership FSM's entire state: chain order (position 0 is
/// head, last is tail) plus the monotonic counter used to derive fresh
/// node ids and ports.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChainState {
    pub nodes: Vec<NodeDescriptor>,
    pub counter: u64,
}

impl ChainState {
    pub fn head(&self) -> Option<&NodeDescriptor> {
        self.nodes.first()
    }

    pub fn tail(&self) -> Option<&NodeDescriptor> {
        self.nodes.last()
    }

    /// A uniformly-random member, used for subscription fan-out. Not
    /// itself part of the replicated state — derived on read.
    pub fn mid(&self, pick: usize) -> Option<&NodeDescriptor> {
        if self.nodes.is_empty() {
            return None;
        }
        self.nodes.get(pick % self.nodes.len())
    }
}

/// The only command the FSM accepts: wholesale replacement of the chain
/// description. Individual add/remove/reroute steps are computed by the
/// chain supervisor and committed as one atomic replacement, per the
/// design note on why one consensus command covers a whole health-check
/// tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    FullChainReplace { nodes: Vec<NodeDescriptor>, counter: u64 },
}

impl Command {
    pub fn apply(self, state: &mut ChainState) {
        match self {
            Command::FullChainReplace { nodes, counter } => {
                state.nodes = nodes;
                state.counter = counter;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boardchain_types::NodeId;

    fn node(id: u64) -> NodeDescriptor {
        NodeDescriptor::new(NodeId::new(id), format!("127.0.0.1:{id}"), format!("127.0.0.1:{}", id + 1), format!("127.0.0.1:{}", id + 2), "token")
    }

    #[test]
    fn head_tail_and_mid_over_empty_state() {
        let state = ChainState::default();
        assert!(state.head().is_none());
        assert!(state.tail().is_none());
        assert!(state.mid(0).is_none());
    }

    #[test]
    fn head_tail_and_mid_over_populated_chain() {
        let state = ChainState { nodes: vec![node(1), node(2), node(3)], counter: 3 };
        assert_eq!(state.head().unwrap().id, NodeId::new(1));
        assert_eq!(state.tail().unwrap().id, NodeId::new(3));
        assert_eq!(state.mid(4).unwrap().id, NodeId::new(2));
    }

    #[test]
    fn full_chain_replace_overwrites_everything() {
        let mut state = ChainState { nodes: vec![node(1)], counter: 1 };
        Command::FullChainReplace { nodes: vec![node(2), node(3)], counter: 7 }.apply(&mut state);
        assert_eq!(state.nodes.len(), 2);
        assert_eq!(state.counter, 7);
    }
}
