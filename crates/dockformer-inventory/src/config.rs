use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Which backend holds the inventory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InventoryBackend {
    /// Embedded on-disk database
    Sled,
    /// Process-local; lost on exit
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    pub backend: InventoryBackend,
    pub path: PathBuf,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            backend: InventoryBackend::Sled,
            path: PathBuf::from("./data/inventory"),
        }
    }
}

impl InventoryConfig {
    pub fn memory() -> Self {
        Self {
            backend: InventoryBackend::Memory,
            ..Default::default()
        }
    }

    pub fn sled(path: impl Into<PathBuf>) -> Self {
        Self {
            backend: InventoryBackend::Sled,
            path: path.into(),
        }
    }
}
