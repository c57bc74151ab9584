//! Log record and the pure function that renders it to bytes.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use chrono::Local;

/// Severity of a log record, in ascending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Fatal => "FATAL",
        }
    }

    /// Records at this level or above are opportunistically shipped to the
    /// backup server (§4.5: ERROR and FATAL only).
    pub fn is_backed_up(self) -> bool {
        matches!(self, Level::Error | Level::Fatal)
    }
}

/// One log call site worth of data, ready to render.
pub struct LogRecord<'a> {
    pub level: Level,
    pub file: &'a str,
    pub line: u32,
    pub logger_name: &'a str,
    pub payload: &'a str,
}

/// Renders a record to `[HH:MM:SS][0x<hex tid>][<LEVEL>][<logger>][<file>:<line>]\t<payload>\n`.
pub fn render(record: &LogRecord<'_>) -> Vec<u8> {
    let time = Local::now().format("%H:%M:%S");
    let tid = hashed_thread_id();
    format!(
        "[{}][0x{:x}][{}][{}][{}:{}]\t{}\n",
        time,
        tid,
        record.level.as_str(),
        record.logger_name,
        record.file,
        record.line,
        record.payload
    )
    .into_bytes()
}

/// A deterministic hash of the current OS thread's identifier, standing in
/// for the original's `std::hash<std::thread::id>`.
fn hashed_thread_id() -> u64 {
    let mut hasher = DefaultHasher::new();
    std::thread::current().id().hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_expected_shape() {
        let record = LogRecord {
            level: Level::Info,
            file: "main.rs",
            line: 42,
            logger_name: "L",
            payload: "hello",
        };
        let rendered = String::from_utf8(render(&record)).unwrap();
        assert!(rendered.starts_with('['));
        assert!(rendered.contains("][INFO][L][main.rs:42]\thello\n"));
        assert!(rendered.ends_with('\n'));
    }

    #[test]
    fn backup_eligibility() {
        assert!(Level::Error.is_backed_up());
        assert!(Level::Fatal.is_backed_up());
        assert!(!Level::Info.is_backed_up());
        assert!(!Level::Debug.is_backed_up());
        assert!(!Level::Warn.is_backed_up());
    }
}
