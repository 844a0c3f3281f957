#[derive(Debug, thiserror::Error)]
pub enum ConsensusError {
    #[error("this node is not the current leader")]
    NotLeader,
    #[error("raft error: {0}")]
    Raft(#[from] raft::Error),
    #[error("failed to encode/decode replicated state: {0}")]
    Codec(#[from] postcard::Error),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("no known raft voter with id {0}")]
    NodeNotFound(u64),
    #[error("raft log storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConsensusError>;
