use std::collections::VecDeque;
use std::path::PathBuf;
use std::time::Duration;

use protobuf::Message as _;
use raft::prelude::*;
use raft::storage::MemStorage;
use raft::{Config, RawNode, StateRole};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::interval;
use tracing::{debug, instrument, warn};

use crate::error::{ConsensusError, Result};
use crate::log::PersistentLog;
use crate::state::{ChainState, Command};
use crate::transport::RaftTransport;

const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Once the on-disk log tail grows past this many entries, trim it back to
/// `RETAIN_RECENT`, forcing any follower more than that far behind onto a
/// raft snapshot transfer instead of entry replay.
const COMPACT_THRESHOLD: u64 = 1000;
const RETAIN_RECENT: usize = 100;

enum Input {
    Step(Message),
    Propose { command: Command, ack: oneshot::Sender<Result<()>> },
}

/// A handle to a running consensus node. The FSM itself runs on a
/// dedicated task; this handle only exposes what the rest of the core is
/// allowed to see: propose a command, read the latest applied state, and
/// watch leadership.
#[derive(Clone)]
pub struct ChainFsm {
    input: mpsc::Sender<Input>,
    state: watch::Receiver<ChainState>,
    leader: watch::Receiver<bool>,
}

impl ChainFsm {
    /// Spawns the consensus node's driving loop on the current Tokio
    /// runtime and returns a handle to it. `peers` are every voter's id
    /// (including this node's own `id`). `data_dir` is where this
    /// replica's raft log, hardstate, and snapshots persist across
    /// restarts; it's created if missing and reloaded if not empty.
    pub fn spawn(id: u64, peers: Vec<u64>, transport: impl RaftTransport + 'static, data_dir: PathBuf) -> Result<Self> {
        let config = Config {
            id,
            election_tick: 10,
            heartbeat_tick: 3,
            max_size_per_msg: 1024 * 1024,
            max_inflight_msgs: 256,
            check_quorum: true,
            pre_vote: true,
            ..Default::default()
        };
        config.validate()?;

        let log = PersistentLog::open(data_dir)?;
        let (loaded_entries, loaded_hardstate, loaded_snapshot) = log.load()?;

        let storage = MemStorage::new_with_conf_state((peers, vec![]));
        {
            let mut core = storage.wl();
            if let Some(snapshot) = loaded_snapshot {
                core.apply_snapshot(snapshot)?;
            }
            core.append(&loaded_entries)?;
            core.set_hardstate(loaded_hardstate.clone());
        }
        let logger = slog::Logger::root(slog::Discard, slog::o!());
        let raw_node = RawNode::new(&config, storage, &logger)?;

        let mut applied = ChainState::default();
        let mut scratch = VecDeque::new();
        for entry in &loaded_entries {
            if entry.index <= loaded_hardstate.commit {
                apply_entry(entry, &mut applied, &mut scratch);
            }
        }
        let persisted_entries: VecDeque<Entry> = loaded_entries.into_iter().collect();

        let (input_tx, input_rx) = mpsc::channel(256);
        let (state_tx, state_rx) = watch::channel(applied.clone());
        let (leader_tx, leader_rx) = watch::channel(false);

        tokio::spawn(drive(
            raw_node,
            input_rx,
            state_tx,
            leader_tx,
            Box::new(transport),
            log,
            persisted_entries,
            applied,
            loaded_hardstate.commit,
        ));

        Ok(Self { input: input_tx, state: state_rx, leader: leader_rx })
    }

    /// Feeds an inbound raft message received from a peer into the node.
    pub async fn step(&self, message: Message) {
        let _ = self.input.send(Input::Step(message)).await;
    }

    /// Proposes a new chain description. Resolves once the proposal is
    /// either committed and applied, or rejected because this node isn't
    /// leader. A dropped channel (node task gone) surfaces as `NotLeader`.
    #[instrument(skip(self, command))]
    pub async fn propose(&self, command: Command) -> Result<()> {
        let (ack, reply) = oneshot::channel();
        self.input.send(Input::Propose { command, ack }).await.map_err(|_| ConsensusError::NotLeader)?;
        reply.await.map_err(|_| ConsensusError::NotLeader)?
    }

    pub fn current_state(&self) -> ChainState {
        self.state.borrow().clone()
    }

    pub fn is_leader(&self) -> bool {
        *self.leader.borrow()
    }

    pub fn watch_state(&self) -> watch::Receiver<ChainState> {
        self.state.clone()
    }
}

async fn drive(
    mut raw_node: RawNode<MemStorage>,
    mut input: mpsc::Receiver<Input>,
    state_tx: watch::Sender<ChainState>,
    leader_tx: watch::Sender<bool>,
    transport: Box<dyn RaftTransport>,
    log: PersistentLog,
    mut persisted_entries: VecDeque<Entry>,
    mut applied: ChainState,
    mut last_commit: u64,
) {
    let mut pending_acks: std::collections::VecDeque<oneshot::Sender<Result<()>>> = std::collections::VecDeque::new();
    let mut ticker = interval(TICK_INTERVAL);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                raw_node.tick();
            }
            maybe = input.recv() => {
                match maybe {
                    Some(Input::Step(message)) => {
                        if let Err(err) = raw_node.step(message) {
                            warn!(%err, "failed to step raft message");
                        }
                    }
                    Some(Input::Propose { command, ack }) => {
                        if raw_node.raft.state != StateRole::Leader {
                            let _ = ack.send(Err(ConsensusError::NotLeader));
                        } else {
                            match postcard_encode(&command) {
                                Ok(data) => {
                                    if raw_node.propose(vec![], data).is_ok() {
                                        pending_acks.push_back(ack);
                                    } else {
                                        let _ = ack.send(Err(ConsensusError::NotLeader));
                                    }
                                }
                                Err(err) => {
                                    let _ = ack.send(Err(err.into()));
                                }
                            }
                        }
                    }
                    None => return,
                }
            }
        }

        if !raw_node.has_ready() {
            continue;
        }
        let mut ready = raw_node.ready();

        if let Some(ss) = ready.ss() {
            let _ = leader_tx.send(ss.raft_state == StateRole::Leader);
        }

        for message in ready.take_messages() {
            transport.send(message).await;
        }

        if !ready.snapshot().is_empty() {
            if let Err(err) = raw_node.mut_store().wl().apply_snapshot(ready.snapshot().clone()) {
                warn!(%err, "failed to apply raft snapshot");
            } else if let Err(err) = log.persist_snapshot(ready.snapshot()) {
                warn!(%err, "failed to persist raft snapshot to disk");
            } else {
                let snapshot_index = ready.snapshot().get_metadata().get_index();
                persisted_entries.retain(|entry| entry.index > snapshot_index);
                if let Err(err) = log.compact(&persisted_entries.iter().cloned().collect::<Vec<_>>()) {
                    warn!(%err, "failed to persist log compaction after snapshot");
                }
            }
        }

        for entry in ready.take_committed_entries() {
            apply_entry(&entry, &mut applied, &mut pending_acks);
        }

        if !ready.entries().is_empty() {
            if let Err(err) = raw_node.mut_store().wl().append(ready.entries()) {
                warn!(%err, "failed to persist raft entries");
            } else if let Err(err) = log.append_entries(ready.entries()) {
                warn!(%err, "failed to persist raft entries to disk");
            } else {
                persisted_entries.extend(ready.entries().iter().cloned());
            }
        }

        if let Some(hs) = ready.hs() {
            raw_node.mut_store().wl().set_hardstate(hs.clone());
            if let Err(err) = log.persist_hardstate(hs) {
                warn!(%err, "failed to persist raft hardstate to disk");
            }
            last_commit = hs.commit;
        }

        for message in ready.take_persisted_messages() {
            transport.send(message).await;
        }

        let mut light_ready = raw_node.advance(ready);
        for message in light_ready.take_messages() {
            transport.send(message).await;
        }
        for entry in light_ready.take_committed_entries() {
            apply_entry(&entry, &mut applied, &mut pending_acks);
        }
        raw_node.advance_apply();

        compact_if_large(&mut raw_node, &log, &mut persisted_entries, last_commit);

        let _ = state_tx.send(applied.clone());
    }
}

/// Trims the raft log once it grows past [`COMPACT_THRESHOLD`] entries,
/// keeping only the most recent [`RETAIN_RECENT`]. A follower further
/// behind than that falls back to a raft snapshot transfer on its next
/// `Ready` cycle instead of entry replay.
fn compact_if_large(raw_node: &mut RawNode<MemStorage>, log: &PersistentLog, persisted_entries: &mut VecDeque<Entry>, last_commit: u64) {
    if (persisted_entries.len() as u64) <= COMPACT_THRESHOLD {
        return;
    }
    let keep_from = persisted_entries.len().saturating_sub(RETAIN_RECENT);
    let Some(boundary) = persisted_entries.get(keep_from) else { return };
    let compact_index = boundary.index.min(last_commit);
    if compact_index == 0 {
        return;
    }
    if let Err(err) = raw_node.mut_store().wl().compact(compact_index) {
        warn!(%err, "failed to compact raft log");
        return;
    }
    persisted_entries.retain(|entry| entry.index > compact_index);
    if let Err(err) = log.compact(&persisted_entries.iter().cloned().collect::<Vec<_>>()) {
        warn!(%err, "failed to persist log compaction to disk");
    }
}

fn apply_entry(
    entry: &Entry,
    state: &mut ChainState,
    pending_acks: &mut std::collections::VecDeque<oneshot::Sender<Result<()>>>,
) {
    if entry.data.is_empty() {
        // Empty entries are emitted on leader election; nothing to apply.
        return;
    }
    if entry.get_entry_type() == EntryType::EntryConfChange {
        debug!("ignoring conf-change entry; chain membership is a replicated value, not a raft voter change");
        return;
    }

    match postcard::from_bytes::<Command>(&entry.data) {
        Ok(command) => {
            command.apply(state);
            if let Some(ack) = pending_acks.pop_front() {
                let _ = ack.send(Ok(()));
            }
        }
        Err(err) => warn!(%err, "failed to decode committed raft entry"),
    }
}

fn postcard_encode(command: &Command) -> std::result::Result<Vec<u8>, postcard::Error> {
    postcard::to_allocvec(command)
}

/// Encodes a raft message for the wire, used by [`crate::transport`].
pub fn encode_message(message: &Message) -> Vec<u8> {
    message.write_to_bytes().expect("protobuf encoding of a well-formed raft message cannot fail")
}

/// Decodes a raft message received from the wire.
pub fn decode_message(bytes: &[u8]) -> Result<Message> {
    Message::parse_from_bytes(bytes).map_err(|e| ConsensusError::Transport(e.to_string()))
}
