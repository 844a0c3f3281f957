use tokio::sync::watch;

use crate::error::DfaError;
use crate::state::NodeState;
use crate::transition::{Dfa, Event};

/// Owns the current [`NodeState`] and publishes every transition on a
/// `tokio::sync::watch` channel. The chain node's role dispatcher
/// subscribes once and reacts to every change; nothing else is allowed to
/// mutate the state directly, so the op-counter a role-loop holds can never
/// be observed by two role-loops at once (see `boardchain-node`, which
/// cancels and restarts its role-loop task on every change it observes
/// here).
pub struct DfaDriver {
    tx: watch::Sender<NodeState>,
}

impl DfaDriver {
    pub fn new() -> (Self, watch::Receiver<NodeState>) {
        let (tx, rx) = watch::channel(NodeState::INITIAL);
        (Self { tx }, rx)
    }

    pub fn current(&self) -> NodeState {
        *self.tx.borrow()
    }

    /// Applies `event` to the current state and publishes the result.
    /// Returns the new state, or leaves the state untouched and returns an
    /// error if the transition is illegal.
    #[tracing::instrument(skip(self), fields(from = %self.current()))]
    pub fn apply(&self, event: Event) -> Result<NodeState, DfaError> {
        let current = self.current();
        let next = Dfa::step(current, event)?;
        tracing::debug!(to = %next, ?event, "dfa transition");
        // `watch::Sender::send` only fails once every receiver has been
        // dropped; a node with no role dispatcher listening has nobody left
        // to act on the new state, so publishing is a best-effort notice,
        // not part of the transition's correctness.
        let _ = self.tx.send(next);
        Ok(next)
    }
}

impl Default for DfaDriver {
    fn default() -> Self {
        Self::new().0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Position, Role};

    #[tokio::test]
    async fn transitions_publish_on_watch_channel() {
        let (driver, mut rx) = DfaDriver::new();
        assert_eq!(*rx.borrow_and_update(), NodeState::INITIAL);

        // A ReaderConfirmer can't directly attach a successor (that role is
        // only valid while Single); demote to Reader first.
        driver.apply(Event::RoleReader).unwrap();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), NodeState::new(Position::Single, Role::Reader));

        driver.apply(Event::SuccessorConnect).unwrap();
        rx.changed().await.unwrap();
        assert_eq!(
            *rx.borrow_and_update(),
            NodeState::new(Position::Head, Role::Reader)
        );
    }

    #[tokio::test]
    async fn illegal_transition_leaves_state_unchanged() {
        let (driver, _rx) = DfaDriver::new();
        let before = driver.current();
        let err = driver.apply(Event::PredecessorConnect).unwrap_err();
        assert_eq!(err.state, before);
        assert_eq!(driver.current(), before);
    }
}
