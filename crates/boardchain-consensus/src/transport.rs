use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use raft::prelude::Message;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tracing::{instrument, warn};

use crate::fsm::{decode_message, encode_message};

/// Point-to-point delivery of raft protocol messages between consensus
/// peers. The FSM driver never inspects raft's own wire format; it only
/// asks a `RaftTransport` to get a message to `message.to`.
#[async_trait]
pub trait RaftTransport: Send + Sync {
    async fn send(&self, message: Message);
}

/// A length-prefixed TCP transport, in the same 4-byte-big-endian-length
/// idiom as `boardchain-wire`'s data-plane framing. It cannot reuse
/// `boardchain_wire::Frame` directly because raft's `Message` is a
/// protobuf type, not `serde`-derived.
///
/// Voter membership itself is fixed at bootstrap (see
/// [`crate::fsm`]'s handling of conf-change entries), but a voter's
/// network address is not: a control-plane replica that restarts behind a
/// new address re-announces itself via [`TcpRaftTransport::update_peer`],
/// called from the `GET /join` handler.
pub struct TcpRaftTransport {
    peer_addrs: Mutex<HashMap<u64, String>>,
    connections: Mutex<HashMap<u64, TcpStream>>,
}

impl TcpRaftTransport {
    pub fn new(peer_addrs: HashMap<u64, String>) -> Self {
        Self { peer_addrs: Mutex::new(peer_addrs), connections: Mutex::new(HashMap::new()) }
    }

    /// Re-registers a known voter's current address. Returns `false` if
    /// `id` was never part of this cluster's bootstrap voter set.
    pub async fn update_peer(&self, id: u64, addr: String) -> bool {
        let mut addrs = self.peer_addrs.lock().await;
        match addrs.get_mut(&id) {
            Some(existing) => {
                *existing = addr;
                self.connections.lock().await.remove(&id);
                true
            }
            None => false,
        }
    }

    async fn connection(&self, to: u64) -> std::io::Result<TcpStream> {
        let mut conns = self.connections.lock().await;
        if let Some(stream) = conns.remove(&to) {
            return Ok(stream);
        }
        let addr = self.peer_addrs.lock().await.get(&to).cloned().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, format!("no known address for raft peer {to}"))
        })?;
        TcpStream::connect(addr).await
    }

    async fn release(&self, to: u64, stream: TcpStream) {
        self.connections.lock().await.insert(to, stream);
    }
}

#[async_trait]
impl RaftTransport for TcpRaftTransport {
    #[instrument(skip(self, message), fields(to = message.to, from = message.from))]
    async fn send(&self, message: Message) {
        let to = message.to;
        let body = encode_message(&message);
        let mut stream = match self.connection(to).await {
            Ok(stream) => stream,
            Err(err) => {
                warn!(%err, "could not reach raft peer");
                return;
            }
        };

        let len = (body.len() as u32).to_be_bytes();
        if stream.write_all(&len).await.is_err() || stream.write_all(&body).await.is_err() {
            warn!(peer = to, "failed to deliver raft message");
            return;
        }
        self.release(to, stream).await;
    }
}

/// Accepts raft messages from peers and feeds them to `on_message`.
pub async fn serve(listener: TcpListener, on_message: Arc<dyn Fn(Message) + Send + Sync>) -> std::io::Result<()> {
    loop {
        let (stream, _) = listener.accept().await?;
        let on_message = on_message.clone();
        tokio::spawn(async move {
            if let Err(err) = read_messages(stream, on_message).await {
                warn!(%err, "raft transport connection closed");
            }
        });
    }
}

async fn read_messages(mut stream: TcpStream, on_message: Arc<dyn Fn(Message) + Send + Sync>) -> std::io::Result<()> {
    loop {
        let mut len_buf = [0u8; 4];
        stream.read_exact(&mut len_buf).await?;
        let len = u32::from_be_bytes(len_buf) as usize;
        let mut body = vec![0u8; len];
        stream.read_exact(&mut body).await?;
        match decode_message(&body) {
            Ok(message) => on_message(message),
            Err(err) => warn!(%err, "dropping malformed raft message"),
        }
    }
}
