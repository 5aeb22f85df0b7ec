use async_trait::async_trait;

use crate::{
    ContainerDetails, ContainerObservation, CreateContainerRequest, ImageInfo, LogStream,
    PullStream, RemoveOptions, Result,
};

/// Core container runtime interface.
///
/// Containers are addressed by their logical name. Every call is a
/// single request to the daemon; nothing is retried or cached here.
#[async_trait]
pub trait RuntimeClient: Send + Sync {
    /// `Ok(None)` when the image is not present locally
    async fn inspect_image(&self, reference: &str) -> Result<Option<ImageInfo>>;

    /// Start pulling `reference`. The pull is complete once the
    /// returned stream is exhausted; an error item means it failed.
    async fn pull_image(&self, reference: &str) -> Result<PullStream>;

    /// `Ok(None)` when no container has this name
    async fn inspect_container(&self, name: &str) -> Result<Option<ContainerDetails>>;

    /// Returns the runtime-assigned container id
    async fn create_container(&self, request: CreateContainerRequest) -> Result<String>;

    async fn start_container(&self, name: &str) -> Result<()>;

    async fn stop_container(&self, name: &str) -> Result<()>;

    async fn restart_container(&self, name: &str) -> Result<()>;

    async fn remove_container(&self, name: &str, options: RemoveOptions) -> Result<()>;

    /// With `all` unset only running containers are listed
    async fn list_containers(&self, all: bool) -> Result<Vec<ContainerObservation>>;

    /// Stdout and stderr of `name`, limited to the last `tail` lines
    async fn stream_logs(&self, name: &str, tail: Option<usize>) -> Result<LogStream>;
}
