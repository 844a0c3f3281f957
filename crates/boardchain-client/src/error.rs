use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("cluster has no nodes yet")]
    ClusterNotReady,

    #[error(transparent)]
    Node(#[from] boardchain_node::NodeError),
}

pub type Result<T> = std::result::Result<T, ClientError>;
