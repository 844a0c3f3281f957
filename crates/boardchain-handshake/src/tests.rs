use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;

use boardchain_types::MessageIndex;
use boardchain_wire::{Confirmation, DatabaseSnapshot, HandshakeMessage, Message};

use crate::channel::Channel;
use crate::client::{run_client, ClientOutcome, ClientSource};
use crate::server::{run_server, ServerOutcome, ServerSource};

struct MpscChannel {
    tx: mpsc::Sender<HandshakeMessage>,
    rx: mpsc::Receiver<HandshakeMessage>,
}

#[async_trait]
impl Channel for MpscChannel {
    type Error = &'static str;

    async fn send(&mut self, message: HandshakeMessage) -> Result<(), &'static str> {
        self.tx.send(message).await.map_err(|_| "closed")
    }

    async fn recv(&mut self) -> Result<HandshakeMessage, &'static str> {
        self.rx.recv().await.ok_or("closed")
    }
}

fn paired_channels() -> (MpscChannel, MpscChannel) {
    let (a_tx, a_rx) = mpsc::channel(8);
    let (b_tx, b_rx) = mpsc::channel(8);
    (MpscChannel { tx: a_tx, rx: b_rx }, MpscChannel { tx: b_tx, rx: a_rx })
}

struct FakeClientSource {
    outbound: Vec<Message>,
    applied: Mutex<Vec<Confirmation>>,
}

#[async_trait]
impl ClientSource for FakeClientSource {
    async fn snapshot(&self) -> DatabaseSnapshot {
        DatabaseSnapshot::default()
    }

    async fn messages_after(&self, index: MessageIndex) -> Vec<Message> {
        self.outbound.iter().filter(|m| MessageIndex::new(m.message_index) > index).cloned().collect()
    }

    async fn apply_confirmations(&self, confirmations: Vec<Confirmation>) -> Result<(), String> {
        self.applied.lock().unwrap().extend(confirmations);
        Ok(())
    }
}

struct FakeServerSource {
    last_message_index: Option<MessageIndex>,
    confirmations: Vec<Confirmation>,
    restored: Arc<Mutex<Option<DatabaseSnapshot>>>,
    applied: Arc<Mutex<Vec<Message>>>,
}

#[async_trait]
impl ServerSource for FakeServerSource {
    fn last_message_index(&self) -> Option<MessageIndex> {
        self.last_message_index
    }

    async fn restore(&self, snapshot: DatabaseSnapshot) -> Result<(), String> {
        *self.restored.lock().unwrap() = Some(snapshot);
        Ok(())
    }

    async fn apply_sync(&self, messages: Vec<Message>) -> Result<(), String> {
        self.applied.lock().unwrap().extend(messages);
        Ok(())
    }

    async fn confirmations_since(&self, index: MessageIndex) -> Vec<Confirmation> {
        self.confirmations.iter().filter(|c| MessageIndex::new(c.message_index) > index).cloned().collect()
    }
}

#[tokio::test]
async fn virgin_successor_gets_a_full_transfer() {
    let (mut client_chan, mut server_chan) = paired_channels();
    let client_source = FakeClientSource { outbound: Vec::new(), applied: Mutex::new(Vec::new()) };
    let server_source = FakeServerSource {
        last_message_index: None,
        confirmations: Vec::new(),
        restored: Arc::new(Mutex::new(None)),
        applied: Arc::new(Mutex::new(Vec::new())),
    };

    let client_task =
        tokio::spawn(async move { run_client(&mut client_chan, &client_source, MessageIndex::ZERO).await });
    let server_task = tokio::spawn(async move { run_server(&mut server_chan, &server_source).await });

    let client_result = client_task.await.unwrap().unwrap();
    let server_result = server_task.await.unwrap().unwrap();

    assert_eq!(client_result, ClientOutcome::Transferred);
    assert_eq!(server_result, ServerOutcome::Transferred);
}

#[tokio::test]
async fn caught_up_successor_gets_a_sync_and_replies_with_confirmations() {
    let (mut client_chan, mut server_chan) = paired_channels();
    let msg2 = Message { message_index: 2, request_id: "r2".into(), op: boardchain_types::Op::Create, payload: dummy_payload() };
    let client_source = FakeClientSource { outbound: vec![msg2.clone()], applied: Mutex::new(Vec::new()) };
    let server_source = FakeServerSource {
        last_message_index: Some(MessageIndex::new(1)),
        confirmations: vec![Confirmation::ok(MessageIndex::new(5), "r5")],
        restored: Arc::new(Mutex::new(None)),
        applied: Arc::new(Mutex::new(Vec::new())),
    };
    let applied_handle = server_source.applied.clone();

    let client_task =
        tokio::spawn(async move { run_client(&mut client_chan, &client_source, MessageIndex::new(4)).await });
    let server_task = tokio::spawn(async move { run_server(&mut server_chan, &server_source).await });

    let client_result = client_task.await.unwrap().unwrap();
    let server_result = server_task.await.unwrap().unwrap();

    assert_eq!(client_result, ClientOutcome::Synced { synced_through: MessageIndex::new(5) });
    assert_eq!(server_result, ServerOutcome::Synced { applied: 1 });
    assert_eq!(applied_handle.lock().unwrap().len(), 1);
}

fn dummy_payload() -> boardchain_types::Payload {
    boardchain_types::Payload::Topic(boardchain_types::Topic { id: boardchain_types::RecordId::new(1), name: "x".into() })
}
