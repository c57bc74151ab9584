//! Sink strategies: stdout, a fixed append-only file, and a size-rolled file.
//!
//! A sink's `flush` contract is to write every byte of the given range in
//! order; errors are logged and the write dropped, never propagated across
//! the drain-thread callback boundary (§7).

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;

use chrono::Local;

/// When a file sink syncs data to the kernel and disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushPolicy {
    /// Write only to the user-space buffer.
    Buffered,
    /// `flush()` the user buffer to the kernel after every write.
    Flush,
    /// `flush()` then `sync_all()` to force kernel buffers to disk.
    FlushAndSync,
}

impl FlushPolicy {
    pub fn from_u8(v: u8) -> Self {
        match v {
            1 => FlushPolicy::Flush,
            2 => FlushPolicy::FlushAndSync,
            _ => FlushPolicy::Buffered,
        }
    }
}

fn apply_policy(file: &mut File, policy: FlushPolicy) {
    match policy {
        FlushPolicy::Buffered => {}
        FlushPolicy::Flush => {
            if let Err(e) = file.flush() {
                tracing::error!(error = %e, "sink: flush failed");
            }
        }
        FlushPolicy::FlushAndSync => {
            if let Err(e) = file.flush() {
                tracing::error!(error = %e, "sink: flush failed");
            }
            if let Err(e) = file.sync_all() {
                tracing::error!(error = %e, "sink: sync_all failed");
            }
        }
    }
}

/// A single append-mode file honoring a [`FlushPolicy`].
pub struct FileSink {
    file: File,
    policy: FlushPolicy,
}

impl FileSink {
    pub fn open(path: impl Into<PathBuf>, policy: FlushPolicy) -> io::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(FileSink { file, policy })
    }

    fn flush(&mut self, data: &[u8]) {
        if let Err(e) = self.file.write_all(data) {
            tracing::error!(error = %e, "sink: file write failed");
            return;
        }
        apply_policy(&mut self.file, self.policy);
    }
}

/// Rolls to a new file when the accumulated size would exceed `max_bytes`.
/// Rotation is checked *before* writing so one record is never split
/// across two files; the new file name encodes the wall-clock time the
/// roll happened, not when it will next roll.
pub struct RollFileSink {
    prefix: String,
    max_bytes: u64,
    policy: FlushPolicy,
    current_size: u64,
    seq: u64,
    file: Option<File>,
}

impl RollFileSink {
    pub fn new(prefix: impl Into<String>, max_bytes: u64, policy: FlushPolicy) -> Self {
        RollFileSink {
            prefix: prefix.into(),
            max_bytes,
            policy,
            current_size: 0,
            seq: 0,
            file: None,
        }
    }

    fn roll(&mut self) -> io::Result<()> {
        self.seq += 1;
        let now = Local::now();
        let name = format!(
            "{}{}{}{}{}{}{}-{}.log",
            self.prefix,
            now.format("%Y"),
            now.format("%-m"),
            now.format("%-d"),
            now.format("%-H"),
            now.format("%-M"),
            now.format("%-S"),
            self.seq,
        );
        if let Some(parent) = std::path::Path::new(&name).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        self.file = Some(OpenOptions::new().create(true).append(true).open(name)?);
        self.current_size = 0;
        Ok(())
    }

    fn flush(&mut self, data: &[u8]) {
        let needs_roll =
            self.file.is_none() || self.current_size >= self.max_bytes;
        if needs_roll {
            if let Err(e) = self.roll() {
                tracing::error!(error = %e, "sink: roll failed");
                return;
            }
        }
        let file = self.file.as_mut().expect("rolled above");
        if let Err(e) = file.write_all(data) {
            tracing::error!(error = %e, "sink: roll-file write failed");
            return;
        }
        self.current_size += data.len() as u64;
        apply_policy(file, self.policy);
    }
}

/// A byte consumer attached to a logger, invoked by the drain thread with a
/// contiguous readable range.
pub enum Sink {
    Stdout,
    File(FileSink),
    RollFile(RollFileSink),
}

impl Sink {
    pub fn flush(&mut self, data: &[u8]) {
        match self {
            Sink::Stdout => {
                if let Err(e) = io::stdout().write_all(data) {
                    tracing::error!(error = %e, "sink: stdout write failed");
                }
            }
            Sink::File(sink) => sink.flush(data),
            Sink::RollFile(sink) => sink.flush(data),
        }
    }
}
