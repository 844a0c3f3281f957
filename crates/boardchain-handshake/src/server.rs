use async_trait::async_trait;
use tracing::instrument;

use boardchain_types::MessageIndex;
use boardchain_wire::{
    ClientMissingData, Confirmation, DatabaseSnapshot, HandshakeMessage, Message, ServerHello, ServerMissingData,
};

use crate::channel::Channel;
use crate::error::HandshakeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerOutcome {
    /// Imported a full snapshot from a virgin attach.
    Transferred,
    /// Applied `applied` messages synced from the upstream.
    Synced { applied: usize },
}

/// Data the handshake server needs from the accepting node.
#[async_trait]
pub trait ServerSource: Send {
    /// The tail of this node's message log, or `None` if it has never
    /// received a message (a virgin successor).
    fn last_message_index(&self) -> Option<MessageIndex>;

    async fn restore(&self, snapshot: DatabaseSnapshot) -> Result<(), String>;
    async fn apply_sync(&self, messages: Vec<Message>) -> Result<(), String>;
    async fn confirmations_since(&self, index: MessageIndex) -> Vec<Confirmation>;
}

/// Runs one handshake attempt as the downstream (server) side.
#[instrument(skip_all)]
pub async fn run_server<C: Channel, S: ServerSource>(
    channel: &mut C,
    source: &S,
) -> Result<ServerOutcome, HandshakeError> {
    let hello = channel.recv().await.map_err(|e| HandshakeError::Transport(e.to_string()))?;
    let HandshakeMessage::ClientHello(client_hello) = hello else {
        return Err(HandshakeError::UnexpectedStep { expected: "ClientHello", received: step_name(&hello) });
    };

    let last_message_index = source.last_message_index();
    let request_transfer = last_message_index.is_none();
    channel
        .send(HandshakeMessage::ServerHello(ServerHello {
            last_message_index: last_message_index.unwrap_or(MessageIndex::ZERO).get(),
            request_transfer,
        }))
        .await
        .map_err(|e| HandshakeError::Transport(e.to_string()))?;

    let missing = channel.recv().await.map_err(|e| HandshakeError::Transport(e.to_string()))?;
    let HandshakeMessage::ClientMissingData(missing) = missing else {
        return Err(HandshakeError::UnexpectedStep { expected: "ClientMissingData", received: step_name(&missing) });
    };

    match missing {
        ClientMissingData::Transfer(snapshot) => {
            source.restore(snapshot).await.map_err(HandshakeError::Restore)?;
            Ok(ServerOutcome::Transferred)
        }
        ClientMissingData::Sync { messages } => {
            let applied = messages.len();
            source.apply_sync(messages).await.map_err(HandshakeError::Apply)?;
            let confirmations =
                source.confirmations_since(MessageIndex::new(client_hello.last_confirmation_index)).await;
            channel
                .send(HandshakeMessage::ServerMissingData(ServerMissingData { confirmations }))
                .await
                .map_err(|e| HandshakeError::Transport(e.to_string()))?;
            Ok(ServerOutcome::Synced { applied })
        }
    }
}

fn step_name(message: &HandshakeMessage) -> &'static str {
    match message {
        HandshakeMessage::ClientHello(_) => "ClientHello",
        HandshakeMessage::ServerHello(_) => "ServerHello",
        HandshakeMessage::ClientMissingData(_) => "ClientMissingData",
        HandshakeMessage::ServerMissingData(_) => "ServerMissingData",
    }
}
