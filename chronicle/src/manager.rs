//! Process-wide registry of named loggers (§4.7).

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::logger::{Logger, LoggerBuilder};

/// Maps logger names to loggers; the `"default"` entry is created lazily on
/// first access. All operations are serialized by a single mutex, closing
/// the check-then-act race the original's `LoggerExist`/`insert` pair had
/// (Open Question (c)): `add` is an atomic insert-if-absent.
#[derive(Default)]
pub struct LoggerManager {
    loggers: HashMap<String, Arc<Logger>>,
}

impl LoggerManager {
    pub fn new() -> Self {
        LoggerManager {
            loggers: HashMap::new(),
        }
    }

    /// Returns the registered logger by name, if any.
    pub fn get(&self, name: &str) -> Option<Arc<Logger>> {
        self.loggers.get(name).cloned()
    }

    /// Inserts `logger` only if its name is not already registered.
    /// Returns `true` if it was inserted, `false` if the name was taken —
    /// the losing logger is simply dropped by the caller, it was never
    /// "replacing" anything in the registry.
    pub fn add(&mut self, logger: Logger) -> bool {
        let name = logger.name().to_string();
        if self.loggers.contains_key(&name) {
            return false;
        }
        self.loggers.insert(name, Arc::new(logger));
        true
    }

    /// Returns the `"default"` logger (single stdout sink, `Safe` mode),
    /// building and registering it on first access.
    pub fn default_logger(&mut self) -> Arc<Logger> {
        if let Some(logger) = self.loggers.get("default") {
            return Arc::clone(logger);
        }
        let logger = Arc::new(LoggerBuilder::new().name("default").build());
        self.loggers.insert("default".to_string(), Arc::clone(&logger));
        logger
    }
}

/// The process-wide singleton manager.
pub static MANAGER: once_cell::sync::Lazy<Mutex<LoggerManager>> =
    once_cell::sync::Lazy::new(|| Mutex::new(LoggerManager::new()));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_names_round_trip() {
        let mut manager = LoggerManager::new();
        assert!(manager.add(LoggerBuilder::new().name("a").build()));
        assert!(manager.add(LoggerBuilder::new().name("b").build()));
        assert_eq!(manager.get("a").unwrap().name(), "a");
        assert_eq!(manager.get("b").unwrap().name(), "b");
        assert!(manager.get("missing").is_none());
    }

    #[test]
    fn second_insert_of_same_name_is_rejected() {
        let mut manager = LoggerManager::new();
        assert!(manager.add(LoggerBuilder::new().name("x").build()));
        assert!(!manager.add(LoggerBuilder::new().name("x").build()));
        assert_eq!(manager.get("x").unwrap().name(), "x");
    }

    #[test]
    fn default_logger_is_created_lazily() {
        let mut manager = LoggerManager::new();
        assert!(manager.get("default").is_none());
        let first = manager.default_logger();
        let second = manager.default_logger();
        assert!(Arc::ptr_eq(&first, &second));
    }
}
