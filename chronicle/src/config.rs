//! Load-once JSON configuration blob (§3, §6).
//!
//! There is no reload and no environment-variable overlay: the config is
//! read once at startup and injected into the pieces that need it, avoiding
//! the order-of-initialization hazards a global singleton would invite.

use std::path::Path;

use serde::Deserialize;

use crate::error::{ChronicleError, Result};

/// Tunables shared by the buffer growth policy, file-sink flush policy, and
/// the backup worker pool.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub buffer_size: usize,
    pub threshold: usize,
    pub linear_growth: usize,
    /// 0 = buffered only, 1 = flush, 2 = flush + sync.
    pub flush_log: u8,
    pub backup_addr: String,
    pub backup_port: u16,
    pub thread_count: usize,
}

impl Config {
    /// Reads and parses the JSON config file at `path`. Missing keys or a
    /// malformed blob are reported as [`ChronicleError::InvalidConfig`].
    pub fn load(path: impl AsRef<Path>) -> Result<Config> {
        let contents = std::fs::read_to_string(path).map_err(ChronicleError::Io)?;
        serde_json::from_str(&contents)
            .map_err(|e| ChronicleError::InvalidConfig(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_a_complete_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{
                "buffer_size": 4096,
                "threshold": 1048576,
                "linear_growth": 1048576,
                "flush_log": 1,
                "backup_addr": "127.0.0.1",
                "backup_port": 9000,
                "thread_count": 4
            }"#,
        )
        .unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.buffer_size, 4096);
        assert_eq!(config.backup_port, 9000);
    }

    #[test]
    fn missing_key_is_a_startup_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"buffer_size": 4096}"#).unwrap();
        assert!(Config::load(&path).is_err());
    }
}
