//! Server error types.

use thiserror::Error;

pub type ServerResult<T> = Result<T, ServerError>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to bind to {addr}: {source}")]
    BindFailed { addr: std::net::SocketAddr, source: std::io::Error },

    #[error(transparent)]
    Consensus(#[from] boardchain_consensus::ConsensusError),

    #[error(transparent)]
    Supervisor(#[from] boardchain_supervisor::SupervisorError),
}
