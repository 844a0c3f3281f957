use std::net::TcpListener;

/// Binds a std `TcpListener` to an OS-assigned port and immediately drops
/// it, handing back the port for a caller to bind an async listener on
/// moments later. Small window for a race against another process, but
/// good enough for single-machine test fixtures.
pub fn free_port() -> std::io::Result<u16> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    listener.local_addr().map(|addr| addr.port())
}
