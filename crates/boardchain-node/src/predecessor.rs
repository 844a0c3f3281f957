use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use boardchain_dfa::Event;
use boardchain_handshake::run_server;
use boardchain_stream::Cause;

use crate::error::Result;
use crate::node::{new_confirmation_channel, new_forward_channel, ChainNode};
use crate::transport::{ConfirmationSink, HandshakeChannel, MessageSource};

/// Accepts predecessor attachments on `ingress_addr`. A chain node has at
/// most one live predecessor; a second incoming connection replaces the
/// first outright (the spec's `ConnectionReplaced` cause) rather than being
/// rejected, since the control plane may legitimately re-point a node's
/// predecessor during a rewire before the old link has noticed it's stale.
#[instrument(skip(node))]
pub async fn run(node: Arc<ChainNode>, ingress_addr: &str) -> std::io::Result<()> {
    let listener = TcpListener::bind(ingress_addr).await?;
    let active: Arc<Mutex<Option<CancellationToken>>> = Arc::new(Mutex::new(None));

    loop {
        let (stream, peer) = listener.accept().await?;
        let node = node.clone();
        let active = active.clone();

        tokio::spawn(async move {
            let cancel = CancellationToken::new();
            if let Some(previous) = active.lock().await.replace(cancel.clone()) {
                info!(%peer, "replacing existing predecessor connection");
                previous.cancel();
            }

            if let Err(err) = handle_connection(&node, stream, cancel).await {
                warn!(%peer, %err, "predecessor connection ended");
            }
        });
    }
}

async fn handle_connection(node: &Arc<ChainNode>, stream: TcpStream, cancel: CancellationToken) -> Result<()> {
    let mut channel = HandshakeChannel::new(stream);
    let outcome = run_server(&mut channel, node.as_ref()).await?;
    info!(?outcome, "predecessor handshake complete");

    let (write, read) = channel.into_halves();
    let sink = ConfirmationSink(write);
    let source = MessageSource(read);

    let (confirm_tx, confirm_rx) = new_confirmation_channel();
    node.attach_predecessor(confirm_tx).await;
    // Already connected (this attachment is a mid-rewire replacement, not a
    // fresh attach): the DFA is already past `Single`, so the transition is
    // illegal and rightly rejected — nothing to act on.
    let _ = node.apply_dfa_event(Event::PredecessorConnect);

    let (message_tx, mut message_rx) = new_forward_channel();
    let pump = tokio::spawn(boardchain_stream::run(sink, source, confirm_rx, message_tx, cancel));

    while let Some(message) = message_rx.recv().await {
        node.handle_replicated_message(message).await;
    }

    let stream_outcome = pump.await.map_err(|_| crate::error::NodeError::Disconnected)?;
    warn!(cause = ?stream_outcome.cause, "predecessor stream ended");

    // A forced replacement also unwinds down this path once its pump
    // notices the shared cancellation token; only a genuine send/recv
    // failure should tear down the DFA position and the attachment the
    // replacement may have already installed.
    if !matches!(stream_outcome.cause, Cause::External) {
        node.detach_predecessor().await;
        let _ = node.apply_dfa_event(Event::PredecessorDisconnect);
    }

    Ok(())
}
