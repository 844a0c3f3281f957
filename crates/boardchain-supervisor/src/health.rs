use boardchain_types::NodeDescriptor;
use boardchain_wire::NodeRole;

/// Position-based role and successor assignment for a chain of survivors,
/// re-derived from scratch every tick rather than incrementally patched —
/// a follower promoted to leader mid-chain always recomputes the same
/// answer from the latest committed description.
pub fn assign_roles(nodes: &[NodeDescriptor]) -> Vec<(NodeRole, String)> {
    let len = nodes.len();
    if len == 0 {
        return Vec::new();
    }
    if len == 1 {
        return vec![(NodeRole::ReaderConfirmer, String::new())];
    }
    (0..len)
        .map(|i| {
            let role = if i == 0 {
                NodeRole::Reader
            } else if i == len - 1 {
                NodeRole::Confirmer
            } else {
                NodeRole::Relay
            };
            let successor = if i == len - 1 { String::new() } else { nodes[i + 1].ingress_addr.clone() };
            (role, successor)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use boardchain_types::NodeId;

    fn node(id: u64) -> NodeDescriptor {
        NodeDescriptor::new(NodeId::new(id), format!("c{id}"), format!("i{id}"), format!("s{id}"), "token")
    }

    #[test]
    fn empty_chain_has_no_assignments() {
        assert!(assign_roles(&[]).is_empty());
    }

    #[test]
    fn single_node_is_reader_confirmer_with_no_successor() {
        let assignments = assign_roles(&[node(1)]);
        assert_eq!(assignments, vec![(NodeRole::ReaderConfirmer, String::new())]);
    }

    #[test]
    fn three_node_chain_is_head_relay_tail() {
        let nodes = vec![node(1), node(2), node(3)];
        let assignments = assign_roles(&nodes);
        assert_eq!(assignments[0], (NodeRole::Reader, "i2".to_string()));
        assert_eq!(assignments[1], (NodeRole::Relay, "i3".to_string()));
        assert_eq!(assignments[2], (NodeRole::Confirmer, String::new()));
    }
}
