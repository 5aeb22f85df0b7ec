use dockformer_engine::{EngineConfig, ReconcileConfig};
use dockformer_inventory::{InventoryBackend, InventoryConfig};
use dockformer_runtime::RuntimeConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{CliError, Result};

pub const CONFIG_ENV: &str = "DOCKFORMER_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "dockformer.toml";

/// Contents of `dockformer.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DockformerConfig {
    pub log_level: String,
    pub runtime: RuntimeConfig,
    pub inventory: InventoryConfig,
    pub reconcile: ReconcileConfig,
}

impl Default for DockformerConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            runtime: RuntimeConfig::default(),
            inventory: InventoryConfig::default(),
            reconcile: ReconcileConfig::default(),
        }
    }
}

impl DockformerConfig {
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::from_runtime_config(&self.runtime)
    }
}

pub struct ConfigManager {
    config: DockformerConfig,
    config_path: PathBuf,
}

impl ConfigManager {
    /// Load from `config_path`, `$DOCKFORMER_CONFIG` or `./dockformer.toml`.
    /// A missing file means defaults.
    pub fn new(config_path: Option<PathBuf>) -> Result<Self> {
        let config_path = config_path
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        let config = if config_path.exists() {
            Self::load_config(&config_path)?
        } else {
            DockformerConfig::default()
        };

        Ok(Self {
            config,
            config_path,
        })
    }

    pub fn get_config(&self) -> &DockformerConfig {
        &self.config
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn reload_config(&mut self) -> Result<()> {
        self.config = Self::load_config(&self.config_path)?;
        Ok(())
    }

    /// Settings that load but are probably not what the operator meant
    pub fn validate_config(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        let config = &self.config;

        if config.inventory.backend == InventoryBackend::Memory {
            warnings.push("Inventory backend is 'memory'; records are lost on exit".to_string());
        }
        if config.reconcile.max_concurrent == 0 {
            warnings.push("reconcile.max_concurrent is 0; using 1".to_string());
        }
        if config.reconcile.interval_seconds == 0 {
            warnings.push("reconcile.interval_seconds is 0; using 1".to_string());
        }
        if config.runtime.inspect_timeout_ms == 0 {
            warnings.push("runtime.inspect_timeout_ms is 0; status refresh will always time out".to_string());
        }
        if !matches!(
            config.log_level.to_lowercase().as_str(),
            "trace" | "debug" | "info" | "warn" | "error"
        ) {
            warnings.push(format!("Unknown log_level '{}'", config.log_level));
        }

        warnings
    }

    fn load_config(path: &Path) -> Result<DockformerConfig> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| CliError::ConfigError(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| CliError::ConfigError(format!("Failed to parse config file: {}", e)))
    }
}
