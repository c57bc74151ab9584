//! Per-connection-thread TCP server (§4.10).
//!
//! One accepted connection gets one spawned thread for its whole lifetime;
//! adequate for the low client cardinality this server serves, and it keeps
//! behavior under a slow client faithful to the original implementation
//! (see the "Per-connection threads in backlog server" design note).

use std::io::{ErrorKind, Read};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;

const READ_CHUNK: usize = 1023;
const LISTEN_BACKLOG: u32 = 32;

/// Callback invoked once per received chunk, already prefixed with the
/// peer's `"ip:port"`. The chunk is the raw bytes read off the wire,
/// unvalidated and unconverted — a multibyte record split across the
/// 1023-byte read boundary must reach the sink intact, not as `U+FFFD`.
pub type SinkFn = dyn Fn(&[u8]) + Send + Sync;

/// Binds `0.0.0.0:<port>` and serves forever, spawning a detached thread
/// per accepted connection. `accept` errors are logged and skipped.
pub fn serve(port: u16, sink: Arc<SinkFn>) -> std::io::Result<()> {
    let listener = TcpListener::bind(("0.0.0.0", port))?;
    // `TcpListener` on Unix has no direct `listen(backlog)` knob once bound;
    // the OS default is typically smaller than 32, so we document the
    // intended backlog here rather than silently diverging from it.
    let _ = LISTEN_BACKLOG;

    for incoming in listener.incoming() {
        match incoming {
            Ok(stream) => {
                let sink = Arc::clone(&sink);
                let peer = stream.peer_addr().ok();
                std::thread::spawn(move || service_connection(stream, peer, sink));
            }
            Err(e) => {
                tracing::error!(error = %e, "backlog-server: accept failed");
            }
        }
    }
    Ok(())
}

fn service_connection(mut stream: TcpStream, peer: Option<SocketAddr>, sink: Arc<SinkFn>) {
    let client_info = peer
        .map(|addr| format!("{}:{}", addr.ip(), addr.port()))
        .unwrap_or_else(|| "unknown:0".to_string());
    tracing::info!(client = %client_info, "backlog-server: client connected");

    let mut buf = [0u8; READ_CHUNK];
    loop {
        match stream.read(&mut buf) {
            Ok(0) => {
                tracing::info!(client = %client_info, "backlog-server: client disconnected");
                break;
            }
            Ok(n) => {
                let mut record = Vec::with_capacity(client_info.len() + n);
                record.extend_from_slice(client_info.as_bytes());
                record.extend_from_slice(&buf[..n]);
                sink(&record);
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                tracing::error!(client = %client_info, error = %e, "backlog-server: read failed");
                break;
            }
        }
    }
}
