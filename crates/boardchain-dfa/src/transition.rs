use crate::error::DfaError;
use crate::state::{NodeState, Position, Role};

/// Events that drive the DFA. The `*Connect`/`*Disconnect` events come from
/// the chain node's predecessor/successor stream supervisors; the `Role*`
/// events come from control-plane `SwitchRole` RPCs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    PredecessorConnect,
    PredecessorDisconnect,
    SuccessorConnect,
    SuccessorDisconnect,
    RoleRelay,
    RoleReader,
    RoleConfirmer,
    RoleReaderConfirmer,
}

/// The pure DFA transition function described in the specification's
/// transition table. Every legal transition is total over `Role` (it
/// carries whatever role the node already had, `X`, through unchanged)
/// except the four `Role*` events, which replace the role outright.
#[derive(Debug, Default, Clone, Copy)]
pub struct Dfa;

impl Dfa {
    pub fn step(state: NodeState, event: Event) -> Result<NodeState, DfaError> {
        use Event::*;
        use Position::*;
        use Role::*;

        let NodeState { position, role } = state;

        let next_position = match (position, event) {
            (Single, PredecessorConnect) if !matches!(role, Reader | ReaderConfirmer) => {
                Some(Tail)
            }
            (Head, PredecessorConnect) => Some(Middle),
            (Single, SuccessorConnect) if !matches!(role, Confirmer | ReaderConfirmer) => {
                Some(Head)
            }
            (Tail, SuccessorConnect) => Some(Middle),
            (Tail, PredecessorDisconnect) => Some(Single),
            (Middle, PredecessorDisconnect) => Some(Head),
            (Head, SuccessorDisconnect) => Some(Single),
            (Middle, SuccessorDisconnect) => Some(Tail),
            // Role-only events never move the position on their own, except
            // RoleReaderConfirmer which is only legal while Single and keeps
            // it there.
            (_, RoleConfirmer) if matches!(position, Single | Tail) => Some(position),
            (_, RoleReader) if matches!(position, Single | Head) => Some(position),
            (Single, RoleReaderConfirmer) => Some(Single),
            (_, RoleRelay) => Some(position),
            _ => None,
        };

        let Some(next_position) = next_position else {
            return Err(DfaError { state, event });
        };

        let next_role = match event {
            RoleRelay => Relay,
            RoleReader => Reader,
            RoleConfirmer => Confirmer,
            RoleReaderConfirmer => ReaderConfirmer,
            _ => role,
        };

        Ok(NodeState::new(next_position, next_role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(NodeState::new(Position::Single, Role::Relay), Event::PredecessorConnect, Some(NodeState::new(Position::Tail, Role::Relay)))]
    #[test_case(NodeState::new(Position::Single, Role::Reader), Event::PredecessorConnect, None)]
    #[test_case(NodeState::new(Position::Head, Role::Relay), Event::PredecessorConnect, Some(NodeState::new(Position::Middle, Role::Relay)))]
    #[test_case(NodeState::new(Position::Single, Role::Relay), Event::SuccessorConnect, Some(NodeState::new(Position::Head, Role::Relay)))]
    #[test_case(NodeState::new(Position::Single, Role::Confirmer), Event::SuccessorConnect, None)]
    #[test_case(NodeState::new(Position::Tail, Role::Relay), Event::SuccessorConnect, Some(NodeState::new(Position::Middle, Role::Relay)))]
    #[test_case(NodeState::new(Position::Tail, Role::Relay), Event::PredecessorDisconnect, Some(NodeState::new(Position::Single, Role::Relay)))]
    #[test_case(NodeState::new(Position::Middle, Role::Relay), Event::PredecessorDisconnect, Some(NodeState::new(Position::Head, Role::Relay)))]
    #[test_case(NodeState::new(Position::Head, Role::Relay), Event::SuccessorDisconnect, Some(NodeState::new(Position::Single, Role::Relay)))]
    #[test_case(NodeState::new(Position::Middle, Role::Relay), Event::SuccessorDisconnect, Some(NodeState::new(Position::Tail, Role::Relay)))]
    #[test_case(NodeState::new(Position::Tail, Role::Relay), Event::RoleConfirmer, Some(NodeState::new(Position::Tail, Role::Confirmer)))]
    #[test_case(NodeState::new(Position::Middle, Role::Relay), Event::RoleConfirmer, None)]
    #[test_case(NodeState::new(Position::Head, Role::Relay), Event::RoleReader, Some(NodeState::new(Position::Head, Role::Reader)))]
    #[test_case(NodeState::new(Position::Single, Role::Relay), Event::RoleReaderConfirmer, Some(NodeState::new(Position::Single, Role::ReaderConfirmer)))]
    #[test_case(NodeState::new(Position::Head, Role::Relay), Event::RoleReaderConfirmer, None)]
    #[test_case(NodeState::new(Position::Middle, Role::Reader), Event::RoleRelay, Some(NodeState::new(Position::Middle, Role::Relay)))]
    fn table(state: NodeState, event: Event, expected: Option<NodeState>) {
        let result = Dfa::step(state, event);
        match expected {
            Some(want) => assert_eq!(result.unwrap(), want),
            None => assert!(result.is_err()),
        }
    }

    #[test]
    fn initial_state_is_single_reader_confirmer() {
        assert_eq!(NodeState::INITIAL, NodeState::new(Position::Single, Role::ReaderConfirmer));
    }
}
