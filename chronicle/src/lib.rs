//! Chronicle — an asynchronous, multi-sink structured logging core.
//!
//! The hard part of this crate is [`worker::AsyncWorker`]: a bounded
//! double-buffered producer/consumer pipeline driven by a single background
//! drain thread. A [`logger::Logger`] owns one of these, renders records
//! through [`record::render`], and opportunistically offloads ERROR/FATAL
//! records to a remote backlog server via a [`pool::WorkerPool`] and
//! [`backup::send`]. [`manager::LoggerManager`] is the process-wide registry
//! of named loggers that the `default()` logger lives in.
//!
//! This crate does not provide queryable log storage, structured indexing,
//! runtime level filtering, time-based rotation, or crash-durability beyond
//! what the configured sink flush policy gives you.

pub mod backup;
pub mod buffer;
pub mod config;
pub mod error;
pub mod format;
pub mod logger;
pub mod manager;
pub mod pool;
pub mod record;
pub mod sink;
pub mod worker;

pub use config::Config;
pub use error::{ChronicleError, Result};
pub use format::FormatArg;
pub use logger::{Logger, LoggerBuilder};
pub use manager::{LoggerManager, MANAGER};
pub use pool::WorkerPool;
pub use record::Level;
pub use sink::FlushPolicy;
pub use worker::AsyncMode;

/// Returns the named logger from the process-wide manager, if registered.
pub fn get_logger(name: &str) -> Option<std::sync::Arc<Logger>> {
    MANAGER.lock().get(name)
}

/// Returns the process-wide `"default"` logger, building it on first access.
pub fn default_logger() -> std::sync::Arc<Logger> {
    MANAGER.lock().default_logger()
}

/// Registers `logger` in the process-wide manager if its name is not
/// already taken.
pub fn add_logger(logger: Logger) -> bool {
    MANAGER.lock().add(logger)
}
