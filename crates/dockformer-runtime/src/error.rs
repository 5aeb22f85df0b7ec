use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Container not found: {0}")]
    ContainerNotFound(String),

    #[error("Image not found: {0}")]
    ImageNotFound(String),

    #[error("Connection error: {message}")]
    ConnectionError { message: String },

    #[error("Runtime operation failed: {operation} - {message}")]
    OperationFailed { operation: String, message: String },

    #[error("Timeout occurred: {operation}")]
    Timeout { operation: String },

    #[error("Stream error: {0}")]
    StreamError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl RuntimeError {
    pub fn operation_failed(operation: &str, message: impl Into<String>) -> Self {
        RuntimeError::OperationFailed {
            operation: operation.to_owned(),
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            RuntimeError::ContainerNotFound(_) | RuntimeError::ImageNotFound(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
