use bytes::BytesMut;
use serde::{de::DeserializeOwned, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use boardchain_wire::{Frame, FrameError};

/// Buffers partial reads off a socket half until a whole [`Frame`] is
/// available, the same shape as `boardchain-node`'s framing glue.
pub struct FrameReader<R> {
    stream: R,
    buf: BytesMut,
}

impl<R: AsyncRead + Unpin> FrameReader<R> {
    pub fn new(stream: R) -> Self {
        Self { stream, buf: BytesMut::new() }
    }

    pub async fn read_one<T: DeserializeOwned>(&mut self) -> std::io::Result<T> {
        loop {
            if let Some(value) = Frame::try_decode(&mut self.buf).map_err(to_io)? {
                return Ok(value);
            }
            let mut chunk = [0u8; 4096];
            let n = self.stream.read(&mut chunk).await?;
            if n == 0 {
                return Err(std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "connection closed mid-frame"));
            }
            self.buf.extend_from_slice(&chunk[..n]);
        }
    }
}

pub async fn write_frame<W: AsyncWrite + Unpin, T: Serialize>(stream: &mut W, value: &T) -> std::io::Result<()> {
    let mut out = BytesMut::new();
    Frame::encode(value, &mut out).map_err(to_io)?;
    stream.write_all(&out).await
}

fn to_io(err: FrameError) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::InvalidData, err.to_string())
}
