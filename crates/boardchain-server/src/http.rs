//! Minimal hand-rolled HTTP/1.1 surface for the control-plane process.
//!
//! Serves two GET endpoints: `/state` (the consensus FSM's latest applied
//! chain description, JSON) and `/join` (leader-only re-announcement of a
//! voter's current address). No keep-alive, no request body, no routing
//! crate — the whole request space is two known paths and a query string.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, warn};

use boardchain_consensus::{ChainFsm, TcpRaftTransport};

pub struct HttpSidecar {
    fsm: ChainFsm,
    transport: Arc<TcpRaftTransport>,
}

#[derive(Serialize)]
struct StateResponse {
    state: boardchain_consensus::ChainState,
    snapshot: SnapshotInfo,
}

#[derive(Serialize)]
struct SnapshotInfo {
    is_leader: bool,
}

impl HttpSidecar {
    pub fn new(fsm: ChainFsm, transport: Arc<TcpRaftTransport>) -> Self {
        Self { fsm, transport }
    }

    pub async fn run(self, addr: &str) -> std::io::Result<()> {
        let listener = TcpListener::bind(addr).await?;
        tracing::info!(%addr, "control-plane HTTP surface listening");
        loop {
            let (stream, peer) = listener.accept().await?;
            let fsm = self.fsm.clone();
            let transport = self.transport.clone();
            tokio::spawn(async move {
                if let Err(err) = handle_one(stream, &fsm, &transport).await {
                    debug!(%peer, %err, "http connection error");
                }
            });
        }
    }
}

async fn handle_one(mut stream: TcpStream, fsm: &ChainFsm, transport: &TcpRaftTransport) -> std::io::Result<()> {
    let mut buf = [0u8; 4096];
    let n = stream.read(&mut buf).await?;
    if n == 0 {
        return Ok(());
    }
    let request = String::from_utf8_lossy(&buf[..n]);

    let response = match parse_request_line(&request) {
        Some((path, query)) => dispatch(path, &query, fsm, transport).await,
        None => http_response(400, "text/plain", "Bad Request"),
    };

    stream.write_all(response.as_bytes()).await
}

fn parse_request_line(request: &str) -> Option<(&str, HashMap<&str, &str>)> {
    let first_line = request.lines().next()?;
    let mut parts = first_line.split_whitespace();
    let method = parts.next()?;
    let target = parts.next()?;
    if method != "GET" {
        return None;
    }
    let (path, query) = target.split_once('?').unwrap_or((target, ""));
    let params = query
        .split('&')
        .filter_map(|kv| kv.split_once('='))
        .collect();
    Some((path, params))
}

async fn dispatch(path: &str, query: &HashMap<&str, &str>, fsm: &ChainFsm, transport: &TcpRaftTransport) -> String {
    match path {
        "/state" => {
            let body = StateResponse { state: fsm.current_state(), snapshot: SnapshotInfo { is_leader: fsm.is_leader() } };
            match serde_json::to_string(&body) {
                Ok(json) => http_response(200, "application/json", &json),
                Err(err) => {
                    warn!(%err, "failed to serialize chain state");
                    http_response(500, "text/plain", "Internal Server Error")
                }
            }
        }
        "/join" => join_response(query, fsm, transport).await,
        _ => http_response(404, "text/plain", "Not Found"),
    }
}

async fn join_response(query: &HashMap<&str, &str>, fsm: &ChainFsm, transport: &TcpRaftTransport) -> String {
    if !fsm.is_leader() {
        return http_response(403, "text/plain", "Forbidden: not leader");
    }
    let (Some(id), Some(addr)) = (query.get("id").and_then(|s| s.parse::<u64>().ok()), query.get("addr")) else {
        return http_response(400, "text/plain", "Bad Request: expected id and addr");
    };
    if transport.update_peer(id, addr.to_string()).await {
        http_response(200, "application/json", "{\"ok\":true}")
    } else {
        http_response(404, "text/plain", "Not Found: unknown voter id")
    }
}

fn http_response(status: u16, content_type: &str, body: &str) -> String {
    let reason = match status {
        200 => "OK",
        400 => "Bad Request",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Unknown",
    };
    format!(
        "HTTP/1.1 {status} {reason}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_get_with_query_string() {
        let (path, query) = parse_request_line("GET /join?id=2&addr=127.0.0.1:9000 HTTP/1.1\r\n").unwrap();
        assert_eq!(path, "/join");
        assert_eq!(query.get("id"), Some(&"2"));
        assert_eq!(query.get("addr"), Some(&"127.0.0.1:9000"));
    }

    #[test]
    fn rejects_non_get() {
        assert!(parse_request_line("POST /state HTTP/1.1\r\n").is_none());
    }

    #[test]
    fn http_response_has_content_length() {
        let resp = http_response(200, "text/plain", "hi");
        assert!(resp.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(resp.contains("Content-Length: 2\r\n"));
    }
}
