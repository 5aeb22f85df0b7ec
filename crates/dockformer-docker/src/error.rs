use dockformer_runtime::RuntimeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DockerError {
    #[error("Docker connection failed: {0}")]
    ConnectionError(String),

    #[error("Docker API error: {0}")]
    ApiError(#[from] bollard::errors::Error),
}

pub type Result<T> = std::result::Result<T, DockerError>;

impl From<DockerError> for RuntimeError {
    fn from(err: DockerError) -> Self {
        match err {
            DockerError::ConnectionError(message) => RuntimeError::ConnectionError { message },
            DockerError::ApiError(e) => RuntimeError::operation_failed("docker", e.to_string()),
        }
    }
}

/// Translate a bollard error for `operation` on `target` into the
/// runtime taxonomy. A 404 from the daemon becomes a not-found error.
pub(crate) fn runtime_error(
    operation: &str,
    target: &str,
    err: bollard::errors::Error,
) -> RuntimeError {
    match err {
        bollard::errors::Error::DockerResponseServerError { status_code: 404, .. } => {
            if operation.ends_with("image") {
                RuntimeError::ImageNotFound(target.to_owned())
            } else {
                RuntimeError::ContainerNotFound(target.to_owned())
            }
        }
        bollard::errors::Error::DockerResponseServerError { status_code, message } => {
            RuntimeError::operation_failed(
                operation,
                format!("{}: daemon returned {}: {}", target, status_code, message),
            )
        }
        bollard::errors::Error::IOError { err } => RuntimeError::ConnectionError {
            message: format!("{} {}: {}", operation, target, err),
        },
        other => RuntimeError::operation_failed(operation, format!("{}: {}", target, other)),
    }
}

pub(crate) fn is_not_found(err: &bollard::errors::Error) -> bool {
    matches!(
        err,
        bollard::errors::Error::DockerResponseServerError { status_code: 404, .. }
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server_error(status_code: u16) -> bollard::errors::Error {
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message: "boom".to_string(),
        }
    }

    #[test]
    fn test_not_found_maps_by_operation() {
        assert!(matches!(
            runtime_error("inspect_container", "web", server_error(404)),
            RuntimeError::ContainerNotFound(name) if name == "web"
        ));
        assert!(matches!(
            runtime_error("inspect_image", "nginx", server_error(404)),
            RuntimeError::ImageNotFound(name) if name == "nginx"
        ));
        assert!(is_not_found(&server_error(404)));
        assert!(!is_not_found(&server_error(500)));
    }

    #[test]
    fn test_server_error_keeps_context() {
        let err = runtime_error("stop_container", "web", server_error(500));
        let message = err.to_string();
        assert!(message.contains("stop_container"));
        assert!(message.contains("web"));
        assert!(message.contains("500"));
    }
}
