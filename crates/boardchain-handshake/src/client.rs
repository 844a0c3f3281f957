use async_trait::async_trait;
use tracing::instrument;

use boardchain_types::MessageIndex;
use boardchain_wire::{
    ClientHello, ClientMissingData, Confirmation, DatabaseSnapshot, HandshakeMessage, Message, ServerHello,
};

use crate::channel::Channel;
use crate::error::HandshakeError;

/// What the client needed to supply to complete the handshake, read back by
/// `boardchain-node` once the attempt succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientOutcome {
    /// The successor was virgin; a full snapshot was sent and no
    /// confirmations are outstanding.
    Transferred,
    /// The successor's log was caught up to `synced_through`; confirmations
    /// beyond `last_confirmation_index` have been delivered and applied.
    Synced { synced_through: MessageIndex },
}

/// Data the handshake client needs from the attaching node. Implemented by
/// `boardchain-node` over its store and outbound replay buffer.
#[async_trait]
pub trait ClientSource: Send {
    async fn snapshot(&self) -> DatabaseSnapshot;
    async fn messages_after(&self, index: MessageIndex) -> Vec<Message>;
    async fn apply_confirmations(&self, confirmations: Vec<Confirmation>) -> Result<(), String>;
}

/// Runs one handshake attempt as the upstream (client) side.
#[instrument(skip_all)]
pub async fn run_client<C: Channel, S: ClientSource>(
    channel: &mut C,
    source: &S,
    last_confirmation_index: MessageIndex,
) -> Result<ClientOutcome, HandshakeError> {
    channel
        .send(HandshakeMessage::ClientHello(ClientHello { last_confirmation_index: last_confirmation_index.get() }))
        .await
        .map_err(|e| HandshakeError::Transport(e.to_string()))?;

    let reply = channel.recv().await.map_err(|e| HandshakeError::Transport(e.to_string()))?;
    let HandshakeMessage::ServerHello(hello) = reply else {
        return Err(HandshakeError::UnexpectedStep { expected: "ServerHello", received: step_name(&reply) });
    };

    if hello.request_transfer {
        let snapshot = source.snapshot().await;
        channel
            .send(HandshakeMessage::ClientMissingData(ClientMissingData::Transfer(snapshot)))
            .await
            .map_err(|e| HandshakeError::Transport(e.to_string()))?;
        return Ok(ClientOutcome::Transferred);
    }

    let server_index = MessageIndex::new(hello.last_message_index);
    let messages = source.messages_after(server_index).await;
    channel
        .send(HandshakeMessage::ClientMissingData(ClientMissingData::Sync { messages }))
        .await
        .map_err(|e| HandshakeError::Transport(e.to_string()))?;

    let reply = channel.recv().await.map_err(|e| HandshakeError::Transport(e.to_string()))?;
    let HandshakeMessage::ServerMissingData(missing) = reply else {
        return Err(HandshakeError::UnexpectedStep { expected: "ServerMissingData", received: step_name(&reply) });
    };

    let synced_through = missing
        .confirmations
        .iter()
        .map(|c| MessageIndex::new(c.message_index))
        .max()
        .unwrap_or(last_confirmation_index);

    source
        .apply_confirmations(missing.confirmations)
        .await
        .map_err(HandshakeError::Apply)?;

    Ok(ClientOutcome::Synced { synced_through })
}

fn step_name(message: &HandshakeMessage) -> &'static str {
    match message {
        HandshakeMessage::ClientHello(_) => "ClientHello",
        HandshakeMessage::ServerHello(_) => "ServerHello",
        HandshakeMessage::ClientMissingData(_) => "ClientMissingData",
        HandshakeMessage::ServerMissingData(_) => "ServerMissingData",
    }
}
