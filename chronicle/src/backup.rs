//! One-shot TCP send of a single record to the backlog server (§4.9).
//!
//! No framing, no acknowledgement, no retries: connect, write everything,
//! close.

use std::io::Write;
use std::net::TcpStream;

/// Connects to `addr:port`, sends `record`, and closes the connection.
pub fn send(addr: &str, port: u16, record: &[u8]) -> std::io::Result<()> {
    let mut stream = TcpStream::connect((addr, port))?;
    stream.write_all(record)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use std::net::TcpListener;

    #[test]
    fn sends_all_bytes_over_one_connection() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let server = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = Vec::new();
            stream.read_to_end(&mut buf).unwrap();
            buf
        });
        send(&addr.ip().to_string(), addr.port(), b"payload").unwrap();
        let received = server.join().unwrap();
        assert_eq!(received, b"payload");
    }
}
