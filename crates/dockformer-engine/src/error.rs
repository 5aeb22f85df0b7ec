use dockformer_inventory::StoreError;
use dockformer_runtime::RuntimeError;
use dockformer_types::TypesError;
use thiserror::Error;

/// A malformed entry in a port mapping field
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PortSpecError {
    #[error("'{entry}' is not hostPort:containerPort[/protocol]")]
    MissingSeparator { entry: String },

    #[error("invalid host port in '{entry}'")]
    InvalidHostPort { entry: String },

    #[error("invalid container port in '{entry}'")]
    InvalidContainerPort { entry: String },

    #[error("unknown protocol '{protocol}' in '{entry}'")]
    UnknownProtocol { entry: String, protocol: String },
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid port mapping for '{name}': {source}")]
    InvalidPortMapping {
        name: String,
        #[source]
        source: PortSpecError,
    },

    #[error("Failed to pull image '{image}' for '{name}': {source}")]
    ImagePullFailed {
        name: String,
        image: String,
        #[source]
        source: RuntimeError,
    },

    #[error("Failed to remove existing container '{name}' before replacing it: {source}")]
    ReplaceFailed {
        name: String,
        #[source]
        source: RuntimeError,
    },

    #[error("Runtime {operation} failed for '{name}': {source}")]
    RuntimeOperationFailed {
        name: String,
        operation: &'static str,
        #[source]
        source: RuntimeError,
    },

    #[error("No inventory record named '{0}'")]
    NotFound(String),

    #[error("Inventory write failed for '{name}': {source}")]
    StoreFailure {
        name: String,
        #[source]
        source: StoreError,
    },

    /// Listing the runtime failed; nothing was reconciled
    #[error("Failed to list runtime containers: {0}")]
    ListFailed(#[source] RuntimeError),

    #[error("Failed to load inventory: {0}")]
    InventoryLoadFailed(#[source] StoreError),

    #[error("Invalid container specification: {0}")]
    InvalidSpec(#[from] TypesError),
}

impl EngineError {
    pub(crate) fn store(name: &str, source: StoreError) -> Self {
        EngineError::StoreFailure {
            name: name.to_owned(),
            source,
        }
    }

    pub(crate) fn runtime(name: &str, operation: &'static str, source: RuntimeError) -> Self {
        EngineError::RuntimeOperationFailed {
            name: name.to_owned(),
            operation,
            source,
        }
    }

    /// Logical name the failure concerns, if any
    pub fn name(&self) -> Option<&str> {
        match self {
            EngineError::InvalidPortMapping { name, .. }
            | EngineError::ImagePullFailed { name, .. }
            | EngineError::ReplaceFailed { name, .. }
            | EngineError::RuntimeOperationFailed { name, .. }
            | EngineError::StoreFailure { name, .. } => Some(name),
            EngineError::NotFound(name) => Some(name),
            EngineError::ListFailed(_)
            | EngineError::InventoryLoadFailed(_)
            | EngineError::InvalidSpec(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
