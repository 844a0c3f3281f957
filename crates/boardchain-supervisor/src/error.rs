use thiserror::Error;

#[derive(Error, Debug)]
pub enum SupervisorError {
    #[error(transparent)]
    Consensus(#[from] boardchain_consensus::ConsensusError),

    #[error(transparent)]
    ProcMgr(#[from] boardchain_procmgr::ProcMgrError),
}

pub type Result<T> = std::result::Result<T, SupervisorError>;
