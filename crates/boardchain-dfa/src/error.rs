use crate::state::NodeState;
use crate::transition::Event;

#[derive(Debug, Clone, thiserror::Error)]
#[error("illegal transition: {event:?} is not valid from {state}")]
pub struct DfaError {
    pub state: NodeState,
    pub event: Event,
}
