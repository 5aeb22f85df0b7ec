use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Runtime connection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Unix socket of the daemon; local defaults (`DOCKER_HOST` or the
    /// standard socket) when unset
    pub socket_path: Option<String>,
    pub timeout_seconds: u64,
    /// Grace period handed to the daemon on stop and restart
    pub stop_timeout_seconds: i64,
    /// Upper bound for a single status-refresh inspect on read paths
    pub inspect_timeout_ms: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            socket_path: None,
            timeout_seconds: 120,
            stop_timeout_seconds: 10,
            inspect_timeout_ms: 2000,
        }
    }
}

impl RuntimeConfig {
    pub fn with_socket_path(mut self, path: &str) -> Self {
        self.socket_path = Some(path.to_owned());
        self
    }

    pub fn effective_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn inspect_timeout(&self) -> Duration {
        Duration::from_millis(self.inspect_timeout_ms)
    }
}
