//! Error types for specification parsing and validation

use thiserror::Error;

/// Result type for this crate
pub type Result<T> = std::result::Result<T, TypesError>;

#[derive(Error, Debug)]
pub enum TypesError {
    /// A required field of a container specification is empty
    #[error("Container specification is missing required field: {field}")]
    MissingField { field: &'static str },

    /// The logical name is not usable as a runtime container name
    #[error("Invalid container name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    /// Two specifications in the same document share a logical name
    #[error("Duplicate container name in document: {0}")]
    DuplicateName(String),

    /// Unknown port protocol suffix
    #[error("Unsupported port protocol: {0}")]
    UnknownProtocol(String),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
