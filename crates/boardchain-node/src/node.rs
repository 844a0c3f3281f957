use std::collections::HashMap;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, oneshot, watch, Mutex};
use tracing::{instrument, warn};

use boardchain_dfa::{DfaDriver, Event, NodeState};
use boardchain_replay::{MessagesAfter, ReplayBuffer};
use boardchain_store::Database;
use boardchain_types::{MessageEvent, MessageIndex, Op, Payload};
use boardchain_wire::{Confirmation, Message};

use crate::config::NodeConfig;
use crate::error::{NodeError, Result};
use crate::intercept;

/// Bound on both replay buffers. A node that falls this far behind needs a
/// full transfer on its next handshake rather than a sync.
const REPLAY_CAPACITY: usize = 4096;

/// Outbound queue depth to a connected successor before backpressure is
/// applied to whatever is forwarding into it.
const FORWARD_QUEUE_DEPTH: usize = 256;

/// Backlog kept for subscribers that briefly lag behind the applied-write
/// stream before they start missing events.
const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// One chain node: the store (C1), the outbound message log and upstream
/// confirmation log (C2, two instantiations), the position/role DFA (C3),
/// and the live predecessor/successor attachments (C4+C5, driven from
/// `successor.rs`/`predecessor.rs`).
pub struct ChainNode {
    pub(crate) config: NodeConfig,
    pub(crate) db: Database,
    pub(crate) outbound: Mutex<ReplayBuffer<Message>>,
    pub(crate) confirmations: Mutex<ReplayBuffer<Confirmation>>,
    last_outbound_index: AtomicI32,
    dfa: DfaDriver,
    state_rx: watch::Receiver<NodeState>,
    successor_tx: Mutex<Option<mpsc::Sender<Message>>>,
    predecessor_tx: Mutex<Option<mpsc::Sender<Confirmation>>>,
    successor_addr: Mutex<Option<String>>,
    desired_successor: watch::Sender<Option<String>>,
    pending: Mutex<HashMap<i32, oneshot::Sender<Confirmation>>>,
    events: broadcast::Sender<MessageEvent>,
}

impl ChainNode {
    pub fn new(config: NodeConfig) -> Arc<Self> {
        let (dfa, state_rx) = DfaDriver::new();
        let (desired_successor, _) = watch::channel(None);
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            config,
            db: Database::new(),
            outbound: Mutex::new(ReplayBuffer::new(REPLAY_CAPACITY)),
            confirmations: Mutex::new(ReplayBuffer::new(REPLAY_CAPACITY)),
            last_outbound_index: AtomicI32::new(0),
            dfa,
            state_rx,
            successor_tx: Mutex::new(None),
            predecessor_tx: Mutex::new(None),
            successor_addr: Mutex::new(None),
            desired_successor,
            pending: Mutex::new(HashMap::new()),
            events,
        })
    }

    /// Subscribes to every write this node applies locally, in application
    /// order. A lagging subscriber observes `RecvError::Lagged` rather than
    /// silently missing events; callers decide whether to resync or drop.
    pub fn subscribe_events(&self) -> broadcast::Receiver<MessageEvent> {
        self.events.subscribe()
    }

    fn publish_event(&self, op: Op, payload: Payload) {
        // `send` only errs when there are no subscribers; that's a normal
        // state; nothing to act on.
        let _ = self.events.send(MessageEvent { op, payload });
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn dfa_state(&self) -> NodeState {
        self.dfa.current()
    }

    pub fn watch_state(&self) -> watch::Receiver<NodeState> {
        self.state_rx.clone()
    }

    pub fn apply_dfa_event(&self, event: Event) -> std::result::Result<NodeState, boardchain_dfa::DfaError> {
        self.dfa.apply(event)
    }

    /// `None` if this node has never produced or forwarded a message.
    pub fn last_message_index(&self) -> Option<MessageIndex> {
        match self.last_outbound_index.load(Ordering::SeqCst) {
            0 => None,
            index => Some(MessageIndex::new(index)),
        }
    }

    pub async fn current_successor(&self) -> Option<String> {
        self.successor_addr.lock().await.clone()
    }

    /// The address the successor-link task should be connected to. Watched
    /// by `successor::run`; set by the control-RPC `SwitchSuccessor` handler.
    pub fn watch_desired_successor(&self) -> watch::Receiver<Option<String>> {
        self.desired_successor.subscribe()
    }

    pub fn set_desired_successor(&self, addr: Option<String>) {
        self.desired_successor.send_replace(addr);
    }

    /// Installs the channel the successor-link task drains into. Replacing
    /// an existing sender (e.g. after a reconnect) drops the old one,
    /// letting its pump loop observe a closed channel and exit.
    pub(crate) async fn attach_successor(&self, addr: String, tx: mpsc::Sender<Message>) {
        *self.successor_addr.lock().await = Some(addr);
        *self.successor_tx.lock().await = Some(tx);
    }

    pub(crate) async fn detach_successor(&self) {
        *self.successor_addr.lock().await = None;
        self.successor_tx.lock().await.take();
    }

    pub(crate) async fn attach_predecessor(&self, tx: mpsc::Sender<Confirmation>) {
        *self.predecessor_tx.lock().await = Some(tx);
    }

    pub(crate) async fn detach_predecessor(&self) {
        self.predecessor_tx.lock().await.take();
    }

    /// Entry point for the client-facing write RPCs (C10): assigns the next
    /// op index, applies it locally, and either resolves immediately (no
    /// successor: this node is `Single`) or forwards downstream and awaits
    /// the confirmation relayed back from the tail.
    #[instrument(skip(self, payload))]
    pub async fn submit(&self, request_id: String, op: Op, payload: Payload) -> Result<Confirmation> {
        let index = MessageIndex::new(self.db.next_op());
        let message = Message { message_index: index.get(), request_id: request_id.clone(), op, payload };

        let (ack_tx, ack_rx) = oneshot::channel();
        self.pending.lock().await.insert(index.get(), ack_tx);

        let outcome = intercept::apply(&self.db, message.op, message.payload.clone()).await;
        let Err(err) = outcome else {
            self.publish_event(message.op, message.payload.clone());
            self.record_outbound(message.clone()).await;

            let has_successor = self.successor_tx.lock().await.is_some();
            if !has_successor {
                self.pending.lock().await.remove(&index.get());
                return Ok(Confirmation::ok(index, request_id));
            }

            self.forward(message).await;
            return ack_rx.await.map_err(|_| NodeError::Disconnected);
        };

        // A client-submitted write that the store itself rejects (e.g. a
        // unique-index conflict) is a normal outcome, not a pipeline
        // invariant violation — it never gets recorded outbound or
        // forwarded, so no downstream node observes it at all.
        self.pending.lock().await.remove(&index.get());
        Ok(Confirmation::error(index, request_id, err))
    }

    /// Applies an inbound replicated write from the predecessor. At a
    /// middle node this forwards the write on; at the tail it resolves into
    /// a confirmation sent back upstream.
    #[instrument(skip(self, message), fields(index = message.message_index))]
    pub async fn handle_replicated_message(&self, message: Message) {
        let index = MessageIndex::new(message.message_index);
        if let Err(err) = self.outbound.lock().await.add(message.clone()) {
            warn!(%err, "replicated message failed continuity check");
        }
        self.last_outbound_index.store(index.get(), Ordering::SeqCst);

        let outcome = intercept::apply(&self.db, message.op, message.payload.clone()).await;
        if outcome.is_ok() {
            self.publish_event(message.op, message.payload.clone());
        }

        let has_successor = self.successor_tx.lock().await.is_some();
        if has_successor {
            if let Err(err) = outcome {
                panic!("store rejected a replicated write mid-chain: {err}");
            }
            self.forward(message).await;
            return;
        }

        let confirmation = match outcome {
            Ok(()) => Confirmation::ok(index, message.request_id),
            Err(err) => Confirmation::error(index, message.request_id, err),
        };
        self.send_confirmation_upstream(confirmation).await;
    }

    /// Applies an inbound confirmation from the successor: resolves the
    /// originating client's pending write if this node issued it, otherwise
    /// relays it on to this node's own predecessor.
    #[instrument(skip(self, confirmation), fields(index = confirmation.message_index))]
    pub async fn handle_confirmation(&self, confirmation: Confirmation) {
        if let Err(err) = self.confirmations.lock().await.add(confirmation.clone()) {
            warn!(%err, "confirmation failed continuity check");
        }

        if let Some(ack) = self.pending.lock().await.remove(&confirmation.message_index) {
            let _ = ack.send(confirmation);
            return;
        }
        self.send_confirmation_upstream(confirmation).await;
    }

    async fn record_outbound(&self, message: Message) {
        let index = message.message_index;
        if let Err(err) = self.outbound.lock().await.add(message) {
            warn!(%err, "failed to record outbound message");
        }
        self.last_outbound_index.store(index, Ordering::SeqCst);
    }

    async fn forward(&self, message: Message) {
        let tx = self.successor_tx.lock().await.clone();
        if let Some(tx) = tx {
            if tx.send(message).await.is_err() {
                warn!("successor channel closed while forwarding; awaiting reconnect");
            }
        }
    }

    async fn send_confirmation_upstream(&self, confirmation: Confirmation) {
        let tx = self.predecessor_tx.lock().await.clone();
        if let Some(tx) = tx {
            if tx.send(confirmation).await.is_err() {
                warn!("predecessor channel closed while confirming");
            }
        }
    }
}

pub(crate) fn new_forward_channel() -> (mpsc::Sender<Message>, mpsc::Receiver<Message>) {
    mpsc::channel(FORWARD_QUEUE_DEPTH)
}

pub(crate) fn new_confirmation_channel() -> (mpsc::Sender<Confirmation>, mpsc::Receiver<Confirmation>) {
    mpsc::channel(FORWARD_QUEUE_DEPTH)
}

pub(crate) fn messages_after(buffer: &ReplayBuffer<Message>, index: MessageIndex) -> Vec<Message> {
    match buffer.messages_after(index) {
        MessagesAfter::Contiguous(items) | MessagesAfter::Incomplete(items) => {
            items.into_iter().cloned().collect()
        }
        MessagesAfter::NoBufferedMessages => Vec::new(),
    }
}

pub(crate) fn confirmations_since(buffer: &ReplayBuffer<Confirmation>, index: MessageIndex) -> Vec<Confirmation> {
    match buffer.messages_after(index) {
        MessagesAfter::Contiguous(items) | MessagesAfter::Incomplete(items) => {
            items.into_iter().cloned().collect()
        }
        MessagesAfter::NoBufferedMessages => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boardchain_types::{RecordId, User};

    fn config() -> NodeConfig {
        NodeConfig {
            id: boardchain_types::NodeId::new(1),
            control_addr: "127.0.0.1:0".into(),
            ingress_addr: "127.0.0.1:0".into(),
            service_addr: "127.0.0.1:0".into(),
            subscribe_token: "test-token".into(),
            logs: "/tmp".into(),
        }
    }

    fn user_payload(name: &str) -> Payload {
        Payload::User(User { id: RecordId::new(0), name: name.into() })
    }

    #[tokio::test]
    async fn single_node_submit_resolves_immediately() {
        let node = ChainNode::new(config());
        let confirmation = node.submit("req-1".into(), Op::Create, user_payload("ada")).await.unwrap();
        assert!(confirmation.ok);
        assert_eq!(node.db.users.get_all().await.len(), 1);
        assert_eq!(node.last_message_index(), Some(MessageIndex::new(1)));
    }

    #[tokio::test]
    async fn head_forwards_and_waits_for_downstream_confirmation() {
        let node = ChainNode::new(config());
        let (tx, mut rx) = new_forward_channel();
        node.attach_successor("127.0.0.1:9".into(), tx).await;

        let node_handle = Arc::clone(&node);
        let submitted = tokio::spawn(async move {
            node_handle.submit("req-2".into(), Op::Create, user_payload("grace")).await
        });

        let forwarded = rx.recv().await.expect("forwarded message");
        assert_eq!(forwarded.request_id, "req-2");

        node.handle_confirmation(Confirmation::ok(MessageIndex::new(forwarded.message_index), "req-2")).await;

        let confirmation = submitted.await.unwrap().unwrap();
        assert!(confirmation.ok);
    }

    #[tokio::test]
    async fn middle_node_forwards_replicated_message_and_relays_confirmation_upstream() {
        let node = ChainNode::new(config());
        let (successor_tx, mut successor_rx) = new_forward_channel();
        node.attach_successor("127.0.0.1:9".into(), successor_tx).await;
        let (predecessor_tx, mut predecessor_rx) = new_confirmation_channel();
        node.attach_predecessor(predecessor_tx).await;

        let message = Message {
            message_index: 1,
            request_id: "req-3".into(),
            op: Op::Create,
            payload: user_payload("turing"),
        };
        node.handle_replicated_message(message.clone()).await;
        let forwarded = successor_rx.recv().await.expect("forwarded downstream");
        assert_eq!(forwarded, message);

        node.handle_confirmation(Confirmation::ok(MessageIndex::new(1), "req-3")).await;
        let relayed = predecessor_rx.recv().await.expect("relayed upstream");
        assert!(relayed.ok);
    }

    #[tokio::test]
    async fn tail_confirms_replicated_message_upstream() {
        let node = ChainNode::new(config());
        let (predecessor_tx, mut predecessor_rx) = new_confirmation_channel();
        node.attach_predecessor(predecessor_tx).await;

        let message =
            Message { message_index: 1, request_id: "req-4".into(), op: Op::Create, payload: user_payload("hopper") };
        node.handle_replicated_message(message).await;

        let confirmation = predecessor_rx.recv().await.expect("confirmation sent upstream");
        assert!(confirmation.ok);
        assert_eq!(confirmation.request_id, "req-4");
    }
}
