use std::sync::Arc;

use tokio::net::TcpStream;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use boardchain_dfa::Event;
use boardchain_handshake::{run_client, RETRY_BACKOFF};
use boardchain_types::MessageIndex;

use crate::error::{NodeError, Result};
use crate::node::{new_confirmation_channel, new_forward_channel, ChainNode};
use crate::transport::{ConfirmationSource, HandshakeChannel, MessageSink};

/// Holds this node's successor link up against whatever address the control
/// plane most recently assigned via `SwitchSuccessor`: dials, runs the
/// handshake, then pumps the steady-state `Replicate` stream until it fails
/// or the desired address changes, reconnecting with [`RETRY_BACKOFF`]
/// between attempts. Runs for the lifetime of the node.
#[instrument(skip(node))]
pub async fn run(node: Arc<ChainNode>) {
    let mut desired = node.watch_desired_successor();
    loop {
        let addr = desired.borrow_and_update().clone();
        let Some(addr) = addr else {
            if desired.changed().await.is_err() {
                return;
            }
            continue;
        };

        if let Err(err) = connect_and_pump(&node, &addr).await {
            warn!(%addr, %err, "successor link failed");
        }

        node.detach_successor().await;
        let _ = node.apply_dfa_event(Event::SuccessorDisconnect);

        // The control plane reassigned us while we were connected (or
        // retrying); pick up the new target immediately instead of sleeping
        // on an address nobody wants anymore.
        if desired.has_changed().unwrap_or(true) {
            continue;
        }
        sleep(RETRY_BACKOFF).await;
    }
}

async fn connect_and_pump(node: &Arc<ChainNode>, addr: &str) -> Result<()> {
    let stream = TcpStream::connect(addr).await.map_err(NodeError::Io)?;
    let mut channel = HandshakeChannel::new(stream);

    let last_confirmation_index =
        node.confirmations.lock().await.last_message_index().unwrap_or(MessageIndex::ZERO);
    let outcome = run_client(&mut channel, node.as_ref(), last_confirmation_index).await?;
    info!(?outcome, %addr, "successor handshake complete");

    let (write, read) = channel.into_halves();
    let sink = MessageSink(write);
    let source = ConfirmationSource(read);

    let (forward_tx, forward_rx) = new_forward_channel();
    node.attach_successor(addr.to_string(), forward_tx).await;
    node.apply_dfa_event(Event::SuccessorConnect)?;

    let (confirm_tx, mut confirm_rx) = new_confirmation_channel();
    let cancel = CancellationToken::new();
    let pump = tokio::spawn(boardchain_stream::run(sink, source, forward_rx, confirm_tx, cancel));

    while let Some(confirmation) = confirm_rx.recv().await {
        node.handle_confirmation(confirmation).await;
    }

    let stream_outcome = pump.await.map_err(|_| NodeError::Disconnected)?;
    warn!(cause = ?stream_outcome.cause, %addr, "successor stream ended");
    Ok(())
}
