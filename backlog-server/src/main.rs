//! Standalone backup sink: a TCP server that appends every received record
//! to a local file, used as the durable landing spot ERROR/FATAL records
//! get shipped to over the network (§4.10).
//!
//! Usage: `backlog-server <port>`. No other flags or environment variables
//! are read.

mod server;

use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Arc;

const LOG_FILE: &str = "./logfile.log";

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args();
    let program = args.next().unwrap_or_else(|| "backlog-server".to_string());
    let port: u16 = match args.next().and_then(|s| s.parse().ok()) {
        Some(port) => port,
        None => {
            eprintln!("usage: {program} <port>");
            std::process::exit(1);
        }
    };

    let sink: Arc<server::SinkFn> = Arc::new(|chunk: &[u8]| append_to_log_file(LOG_FILE, chunk));

    if let Err(e) = server::serve(port, sink) {
        tracing::error!(error = %e, "backlog-server: failed to bind listener");
        std::process::exit(1);
    }
}

/// Opens, appends, flushes and closes `path` once per record, writing
/// exactly the bytes received — the wire already carries `\n`-terminated
/// rendered records, so nothing is added, stripped, or re-encoded here. A
/// write failure means the backup destination itself is broken, so we
/// abort rather than silently dropping records we were specifically asked
/// to keep.
fn append_to_log_file(path: &str, record: &[u8]) {
    let result = (|| -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(record)?;
        file.flush()
    })();

    if let Err(e) = result {
        tracing::error!(error = %e, path, "backlog-server: failed to persist record");
        std::process::abort();
    }
}
