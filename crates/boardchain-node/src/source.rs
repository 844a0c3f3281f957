use async_trait::async_trait;

use boardchain_handshake::{ClientSource, ServerSource};
use boardchain_types::MessageIndex;
use boardchain_wire::{Confirmation, DatabaseSnapshot, Message};

use crate::node::{confirmations_since, messages_after, ChainNode};

fn to_wire_snapshot(snapshot: boardchain_store::DatabaseSnapshot) -> DatabaseSnapshot {
    DatabaseSnapshot {
        users: snapshot.users,
        topics: snapshot.topics,
        messages: snapshot.messages,
        likes: snapshot.likes,
        op_count: snapshot.op_count,
    }
}

fn from_wire_snapshot(snapshot: DatabaseSnapshot) -> boardchain_store::DatabaseSnapshot {
    boardchain_store::DatabaseSnapshot {
        users: snapshot.users,
        topics: snapshot.topics,
        messages: snapshot.messages,
        likes: snapshot.likes,
        op_count: snapshot.op_count,
    }
}

#[async_trait]
impl ClientSource for ChainNode {
    async fn snapshot(&self) -> DatabaseSnapshot {
        to_wire_snapshot(self.db().snapshot().await)
    }

    async fn messages_after(&self, index: MessageIndex) -> Vec<Message> {
        messages_after(&*self.outbound.lock().await, index)
    }

    async fn apply_confirmations(&self, confirmations: Vec<Confirmation>) -> std::result::Result<(), String> {
        for confirmation in confirmations {
            self.handle_confirmation(confirmation).await;
        }
        Ok(())
    }
}

#[async_trait]
impl ServerSource for ChainNode {
    fn last_message_index(&self) -> Option<MessageIndex> {
        ChainNode::last_message_index(self)
    }

    async fn restore(&self, snapshot: DatabaseSnapshot) -> std::result::Result<(), String> {
        self.db().restore(from_wire_snapshot(snapshot)).await.map_err(|err| err.to_string())
    }

    async fn apply_sync(&self, messages: Vec<Message>) -> std::result::Result<(), String> {
        for message in messages {
            self.handle_replicated_message(message).await;
        }
        Ok(())
    }

    async fn confirmations_since(&self, index: MessageIndex) -> Vec<Confirmation> {
        confirmations_since(&*self.confirmations.lock().await, index)
    }
}
