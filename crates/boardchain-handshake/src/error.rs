#[derive(Debug, thiserror::Error)]
pub enum HandshakeError {
    #[error("handshake channel error: {0}")]
    Transport(String),
    #[error("expected {expected} but received {received}")]
    UnexpectedStep { expected: &'static str, received: &'static str },
    #[error("failed to restore from transferred snapshot: {0}")]
    Restore(String),
    #[error("failed to apply synced messages: {0}")]
    Apply(String),
}
