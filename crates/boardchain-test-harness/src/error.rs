use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error(transparent)]
    Node(#[from] boardchain_node::NodeError),

    #[error(transparent)]
    ProcMgr(#[from] boardchain_procmgr::ProcMgrError),

    #[error("node rejected control rpc: {0}")]
    Rejected(String),

    #[error("failed to allocate an ephemeral port: {0}")]
    PortAllocation(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HarnessError>;
