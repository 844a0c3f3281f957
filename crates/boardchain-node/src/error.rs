use thiserror::Error;

#[derive(Error, Debug)]
pub enum NodeError {
    #[error(transparent)]
    Store(#[from] boardchain_store::StoreError),

    #[error(transparent)]
    Dfa(#[from] boardchain_dfa::DfaError),

    #[error(transparent)]
    Handshake(#[from] boardchain_handshake::HandshakeError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("no successor is currently attached")]
    NoSuccessor,

    #[error("this node does not currently accept client writes")]
    NotReader,

    #[error("downstream confirmation channel closed before a reply arrived")]
    Disconnected,
}

pub type Result<T> = std::result::Result<T, NodeError>;
