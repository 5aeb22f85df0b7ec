use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("A record named '{0}' already exists")]
    DuplicateName(String),

    /// The stored record changed between read and write
    #[error("Concurrent modification of record '{0}'")]
    Conflict(String),

    #[error("Storage backend error: {0}")]
    Backend(#[from] sled::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;
