use async_trait::async_trait;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

use boardchain_handshake::Channel;
use boardchain_stream::{Sink, Source};
use boardchain_wire::{Confirmation, HandshakeMessage, Message, ReplicateMessage};

use crate::framed::{write_frame, FrameReader};

/// Carries the four-step handshake over a freshly connected or accepted
/// `TcpStream`, split up front so the same halves can be handed straight to
/// the steady-state `Replicate` pump without a reconnect.
pub struct HandshakeChannel {
    write: OwnedWriteHalf,
    read: FrameReader<OwnedReadHalf>,
}

impl HandshakeChannel {
    pub fn new(stream: TcpStream) -> Self {
        let (read, write) = stream.into_split();
        Self { write, read: FrameReader::new(read) }
    }

    pub fn into_halves(self) -> (OwnedWriteHalf, FrameReader<OwnedReadHalf>) {
        (self.write, self.read)
    }
}

#[async_trait]
impl Channel for HandshakeChannel {
    type Error = std::io::Error;

    async fn send(&mut self, message: HandshakeMessage) -> std::io::Result<()> {
        write_frame(&mut self.write, &message).await
    }

    async fn recv(&mut self) -> std::io::Result<HandshakeMessage> {
        self.read.read_one().await
    }
}

/// Successor-side write half: forwards new writes downstream.
pub struct MessageSink(pub OwnedWriteHalf);

#[async_trait]
impl Sink for MessageSink {
    type Item = Message;
    type Error = std::io::Error;

    async fn send(&mut self, item: Message) -> std::io::Result<()> {
        write_frame(&mut self.0, &ReplicateMessage::Message(item)).await
    }
}

/// Successor-side read half: receives confirmations flowing back upstream.
pub struct ConfirmationSource(pub FrameReader<OwnedReadHalf>);

#[async_trait]
impl Source for ConfirmationSource {
    type Item = Confirmation;
    type Error = std::io::Error;

    async fn recv(&mut self) -> std::io::Result<Confirmation> {
        loop {
            match self.0.read_one::<ReplicateMessage>().await? {
                ReplicateMessage::Confirmation(c) => return Ok(c),
                ReplicateMessage::Message(_) => continue,
            }
        }
    }
}

/// Predecessor-side write half: sends confirmations upstream.
pub struct ConfirmationSink(pub OwnedWriteHalf);

#[async_trait]
impl Sink for ConfirmationSink {
    type Item = Confirmation;
    type Error = std::io::Error;

    async fn send(&mut self, item: Confirmation) -> std::io::Result<()> {
        write_frame(&mut self.0, &ReplicateMessage::Confirmation(item)).await
    }
}

/// Predecessor-side read half: receives new writes flowing downstream.
pub struct MessageSource(pub FrameReader<OwnedReadHalf>);

#[async_trait]
impl Source for MessageSource {
    type Item = Message;
    type Error = std::io::Error;

    async fn recv(&mut self) -> std::io::Result<Message> {
        loop {
            match self.0.read_one::<ReplicateMessage>().await? {
                ReplicateMessage::Message(m) => return Ok(m),
                ReplicateMessage::Confirmation(_) => continue,
            }
        }
    }
}
