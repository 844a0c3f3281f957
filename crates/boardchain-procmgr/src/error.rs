use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcMgrError {
    #[error("failed to spawn data-node process: {0}")]
    Spawn(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("control RPC timed out")]
    Timeout,

    #[error("control RPC failed: {0}")]
    Control(String),

    #[error("data node rejected the request: {0}")]
    Rejected(String),
}

pub type Result<T> = std::result::Result<T, ProcMgrError>;
