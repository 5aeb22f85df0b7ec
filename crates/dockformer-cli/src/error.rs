use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    EngineError(#[from] dockformer_engine::EngineError),

    #[error("Container document error: {0}")]
    DocumentError(#[from] dockformer_types::TypesError),

    #[error("Inventory error: {0}")]
    InventoryError(#[from] dockformer_inventory::StoreError),

    #[error("Runtime error: {0}")]
    RuntimeError(#[from] dockformer_runtime::RuntimeError),

    #[error("Docker error: {0}")]
    DockerError(#[from] dockformer_docker::DockerError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CliError>;
