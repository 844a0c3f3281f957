use bytes::{Buf, BufMut, BytesMut};
use serde::{de::DeserializeOwned, Serialize};

/// Size of the length prefix every frame carries.
pub const FRAME_HEADER_SIZE: usize = 4;

/// Maximum payload size accepted when decoding, guarding against a
/// corrupt or malicious length prefix causing an unbounded allocation.
const MAX_FRAME_PAYLOAD: u32 = 64 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("frame payload of {0} bytes exceeds the {MAX_FRAME_PAYLOAD}-byte limit")]
    TooLarge(u32),
    #[error("postcard encode failed: {0}")]
    Encode(#[from] postcard::Error),
}

/// A length-prefixed, postcard-encoded frame.
///
/// `Frame` itself carries no payload type information; callers pick the
/// right `HandshakeMessage`/`ReplicateMessage`/`ControlRequest` variant by
/// protocol context (which stream they're reading from), mirroring how the
/// data-link streams in §6 are each dedicated to one message family.
pub struct Frame;

impl Frame {
    /// Encodes `payload` into `out`, prefixed with its length.
    pub fn encode<T: Serialize>(payload: &T, out: &mut BytesMut) -> Result<(), FrameError> {
        let body = postcard::to_allocvec(payload)?;
        let len: u32 = body
            .len()
            .try_into()
            .map_err(|_| FrameError::TooLarge(u32::MAX))?;
        if len > MAX_FRAME_PAYLOAD {
            return Err(FrameError::TooLarge(len));
        }
        out.reserve(FRAME_HEADER_SIZE + body.len());
        out.put_u32(len);
        out.put_slice(&body);
        Ok(())
    }

    /// Attempts to decode one frame from the front of `buf`, advancing it
    /// past the frame on success. Returns `None` if `buf` does not yet
    /// contain a whole frame (the caller should read more bytes from the
    /// socket and retry).
    pub fn try_decode<T: DeserializeOwned>(buf: &mut BytesMut) -> Result<Option<T>, FrameError> {
        if buf.len() < FRAME_HEADER_SIZE {
            return Ok(None);
        }
        let len = u32::from_be_bytes(buf[..FRAME_HEADER_SIZE].try_into().unwrap()) as usize;
        if buf.len() < FRAME_HEADER_SIZE + len {
            return Ok(None);
        }

        buf.advance(FRAME_HEADER_SIZE);
        let body = buf.split_to(len);
        let payload = postcard::from_bytes(&body)?;
        Ok(Some(payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
    struct Demo {
        a: u32,
        b: String,
    }

    #[test]
    fn round_trips() {
        let mut buf = BytesMut::new();
        let value = Demo { a: 7, b: "hi".into() };
        Frame::encode(&value, &mut buf).unwrap();

        let decoded: Demo = Frame::try_decode(&mut buf).unwrap().unwrap();
        assert_eq!(decoded, value);
        assert!(buf.is_empty());
    }

    #[test]
    fn incomplete_frame_yields_none() {
        let mut buf = BytesMut::new();
        let value = Demo { a: 1, b: "x".into() };
        Frame::encode(&value, &mut buf).unwrap();
        buf.truncate(buf.len() - 1);

        let decoded: Option<Demo> = Frame::try_decode(&mut buf).unwrap();
        assert!(decoded.is_none());
    }
}
