use async_trait::async_trait;

use boardchain_wire::HandshakeMessage;

/// One handshake connection: exactly four `send`/`recv` calls are made
/// across a run, alternating by role (see [`crate::run_client`] /
/// [`crate::run_server`]).
#[async_trait]
pub trait Channel: Send {
    type Error: std::fmt::Display + Send + Sync + 'static;

    async fn send(&mut self, message: HandshakeMessage) -> Result<(), Self::Error>;
    async fn recv(&mut self) -> Result<HandshakeMessage, Self::Error>;
}
