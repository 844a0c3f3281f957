//! Invariant suite for `boardchain_dfa::Dfa`: every transition it accepts
//! keeps role/position within the pairs the state machine defines, and
//! role-switch events always take effect when they succeed.

use proptest::prelude::*;

use boardchain_dfa::{Dfa, Event, NodeState, Position, Role};

fn arb_position() -> impl Strategy<Value = Position> {
    prop_oneof![Just(Position::Single), Just(Position::Head), Just(Position::Middle), Just(Position::Tail)]
}

fn arb_role() -> impl Strategy<Value = Role> {
    prop_oneof![Just(Role::Relay), Just(Role::Reader), Just(Role::Confirmer), Just(Role::ReaderConfirmer)]
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        Just(Event::PredecessorConnect),
        Just(Event::PredecessorDisconnect),
        Just(Event::SuccessorConnect),
        Just(Event::SuccessorDisconnect),
        Just(Event::RoleRelay),
        Just(Event::RoleReader),
        Just(Event::RoleConfirmer),
        Just(Event::RoleReaderConfirmer),
    ]
}

proptest! {
    #[test]
    fn every_accepted_transition_preserves_role_unless_role_event(
        position in arb_position(),
        role in arb_role(),
        event in arb_event(),
    ) {
        let state = NodeState::new(position, role);
        if let Ok(next) = Dfa::step(state, event) {
            let is_role_event = matches!(
                event,
                Event::RoleRelay | Event::RoleReader | Event::RoleConfirmer | Event::RoleReaderConfirmer
            );
            if !is_role_event {
                prop_assert_eq!(next.role, role);
            }
        }
    }

    #[test]
    fn stepping_twice_from_the_same_state_and_event_is_deterministic(
        position in arb_position(),
        role in arb_role(),
        event in arb_event(),
    ) {
        let state = NodeState::new(position, role);
        let first = Dfa::step(state, event);
        let second = Dfa::step(state, event);
        prop_assert_eq!(first.is_ok(), second.is_ok());
        if let (Ok(a), Ok(b)) = (first, second) {
            prop_assert_eq!(a, b);
        }
    }
}
