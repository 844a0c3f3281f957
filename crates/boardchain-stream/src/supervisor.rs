use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use crate::cause::Cause;
use crate::duplex::{Sink, Source};

/// An outbound message that could not be handed to the stream, carried back
/// to the caller so it can be replayed after reconnection.
#[derive(Debug, Clone)]
pub struct DroppedMessage<O> {
    pub message: O,
    pub error: String,
}

#[derive(Debug)]
pub struct Outcome<O> {
    pub cause: Cause,
    pub dropped: Option<DroppedMessage<O>>,
}

/// Pumps `outbound` into `tx` and `rx` into `inbound` until either direction
/// fails or `cancel` is tripped from outside. Messages are delivered to
/// `tx.send` in enqueue order and published to `inbound` in the order they
/// were received; the two directions run concurrently and neither waits on
/// the other.
#[instrument(skip_all)]
pub async fn run<O, I, Tx, Rx>(
    tx: Tx,
    rx: Rx,
    outbound: mpsc::Receiver<O>,
    inbound: mpsc::Sender<I>,
    cancel: CancellationToken,
) -> Outcome<O>
where
    O: Clone + Send + 'static,
    I: Send + 'static,
    Tx: Sink<Item = O> + 'static,
    Rx: Source<Item = I> + 'static,
{
    let reason: Arc<Mutex<Option<Cause>>> = Arc::new(Mutex::new(None));

    let transmit_dropped = transmit(tx, outbound, cancel.clone(), reason.clone());
    let receive = receive(rx, inbound, cancel.clone(), reason.clone());

    let (dropped, ()) = tokio::join!(transmit_dropped, receive);

    cancel.cancel();
    let cause = (*reason.lock().expect("not poisoned")).unwrap_or(Cause::External);
    Outcome { cause, dropped }
}

async fn transmit<O, Tx>(
    mut tx: Tx,
    mut outbound: mpsc::Receiver<O>,
    cancel: CancellationToken,
    reason: Arc<Mutex<Option<Cause>>>,
) -> Option<DroppedMessage<O>>
where
    O: Clone + Send + 'static,
    Tx: Sink<Item = O>,
{
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => return None,
            maybe = outbound.recv() => {
                let Some(message) = maybe else { return None };
                if let Err(error) = tx.send(message.clone()).await {
                    set_reason(&reason, Cause::SendFailed);
                    cancel.cancel();
                    return Some(DroppedMessage { message, error: error.to_string() });
                }
            }
        }
    }
}

async fn receive<I, Rx>(
    mut rx: Rx,
    inbound: mpsc::Sender<I>,
    cancel: CancellationToken,
    reason: Arc<Mutex<Option<Cause>>>,
) where
    I: Send + 'static,
    Rx: Source<Item = I>,
{
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => return,
            result = rx.recv() => {
                match result {
                    Ok(item) => {
                        if inbound.send(item).await.is_err() {
                            set_reason(&reason, Cause::RecvFailed);
                            cancel.cancel();
                            return;
                        }
                    }
                    Err(_) => {
                        set_reason(&reason, Cause::RecvFailed);
                        cancel.cancel();
                        return;
                    }
                }
            }
        }
    }
}

fn set_reason(reason: &Mutex<Option<Cause>>, cause: Cause) {
    let mut guard = reason.lock().expect("not poisoned");
    if guard.is_none() {
        *guard = Some(cause);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct VecSink {
        out: mpsc::UnboundedSender<u32>,
        fail_after: Option<usize>,
        sent: usize,
    }

    #[async_trait::async_trait]
    impl Sink for VecSink {
        type Item = u32;
        type Error = &'static str;

        async fn send(&mut self, item: u32) -> Result<(), &'static str> {
            if self.fail_after == Some(self.sent) {
                return Err("boom");
            }
            self.sent += 1;
            let _ = self.out.send(item);
            Ok(())
        }
    }

    struct NeverSource;

    #[async_trait::async_trait]
    impl Source for NeverSource {
        type Item = u32;
        type Error = &'static str;

        async fn recv(&mut self) -> Result<u32, &'static str> {
            std::future::pending().await
        }
    }

    struct FailingSource;

    #[async_trait::async_trait]
    impl Source for FailingSource {
        type Item = u32;
        type Error = &'static str;

        async fn recv(&mut self) -> Result<u32, &'static str> {
            Err("disconnected")
        }
    }

    #[tokio::test]
    async fn delivers_in_order_and_stops_on_external_cancel() {
        let (seen_tx, mut seen_rx) = mpsc::unbounded_channel();
        let sink = VecSink { out: seen_tx, fail_after: None, sent: 0 };
        let (out_tx, out_rx) = mpsc::channel(8);
        let (in_tx, _in_rx) = mpsc::channel(8);
        let cancel = CancellationToken::new();

        out_tx.send(1).await.unwrap();
        out_tx.send(2).await.unwrap();
        out_tx.send(3).await.unwrap();

        let cancel_clone = cancel.clone();
        let handle = tokio::spawn(run(sink, NeverSource, out_rx, in_tx, cancel));
        assert_eq!(seen_rx.recv().await, Some(1));
        assert_eq!(seen_rx.recv().await, Some(2));
        assert_eq!(seen_rx.recv().await, Some(3));

        cancel_clone.cancel();
        let outcome = handle.await.unwrap();
        assert_eq!(outcome.cause, Cause::External);
        assert!(outcome.dropped.is_none());
    }

    #[tokio::test]
    async fn send_failure_reports_dropped_message_and_cancels() {
        let (seen_tx, _seen_rx) = mpsc::unbounded_channel();
        let sink = VecSink { out: seen_tx, fail_after: Some(0), sent: 0 };
        let (out_tx, out_rx) = mpsc::channel(8);
        let (in_tx, _in_rx) = mpsc::channel(8);
        let cancel = CancellationToken::new();

        out_tx.send(42).await.unwrap();

        let outcome = run(sink, NeverSource, out_rx, in_tx, cancel).await;
        assert_eq!(outcome.cause, Cause::SendFailed);
        assert_eq!(outcome.dropped.unwrap().message, 42);
    }

    #[tokio::test]
    async fn recv_failure_cancels_the_loop() {
        let (seen_tx, _seen_rx) = mpsc::unbounded_channel();
        let sink = VecSink { out: seen_tx, fail_after: None, sent: 0 };
        let (_out_tx, out_rx) = mpsc::channel::<u32>(8);
        let (in_tx, _in_rx) = mpsc::channel(8);
        let cancel = CancellationToken::new();

        let outcome = run(sink, FailingSource, out_rx, in_tx, cancel).await;
        assert_eq!(outcome.cause, Cause::RecvFailed);
        assert!(outcome.dropped.is_none());
    }
}
