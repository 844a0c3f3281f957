use std::time::Duration;

use bytes::BytesMut;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::instrument;

use boardchain_wire::{ControlRequest, ControlResponse, Frame};

use crate::error::{ProcMgrError, Result};

/// 1-second deadline for every control RPC (spec: "Ping(node) -> err
/// (1-second RPC deadline)"), applied uniformly to the other control RPCs
/// too since none of them are expected to take longer than a ping.
pub const CONTROL_RPC_DEADLINE: Duration = Duration::from_secs(1);

/// Sends one `ControlRequest` to `addr` and waits for the matching
/// `ControlResponse`, bounded by [`CONTROL_RPC_DEADLINE`].
#[instrument(skip(request))]
pub async fn send_control(addr: &str, request: ControlRequest) -> Result<ControlResponse> {
    timeout(CONTROL_RPC_DEADLINE, call(addr, request)).await.map_err(|_| ProcMgrError::Timeout)?
}

async fn call(addr: &str, request: ControlRequest) -> Result<ControlResponse> {
    let mut stream = TcpStream::connect(addr).await?;

    let mut out = BytesMut::new();
    Frame::encode(&request, &mut out).map_err(|e| ProcMgrError::Control(e.to_string()))?;
    stream.write_all(&out).await?;

    let mut buf = BytesMut::new();
    loop {
        if let Some(response) = Frame::try_decode::<ControlResponse>(&mut buf).map_err(|e| ProcMgrError::Control(e.to_string()))? {
            return Ok(response);
        }
        let mut chunk = [0u8; 4096];
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Err(ProcMgrError::Control("connection closed before a response arrived".into()));
        }
        buf.extend_from_slice(&chunk[..n]);
    }
}
