use dockformer_types::{ContainerStatus, ObservedPort, PortBindings};
use futures_util::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;

use crate::error::RuntimeError;

/// Everything the runtime needs to create one container
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateContainerRequest {
    pub name: String,
    pub image: String,
    /// `KEY=VALUE` entries; the runtime treats them as a set
    pub env: Vec<String>,
    /// Bind table; its key set is also the exposed port set
    pub ports: PortBindings,
    pub command: Option<Vec<String>>,
    pub binds: Vec<String>,
    pub networks: Vec<String>,
}

/// Options for removing a container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RemoveOptions {
    pub force: bool,
    /// Also remove anonymous volumes owned by the container
    pub remove_volumes: bool,
}

impl RemoveOptions {
    /// Kill if running and drop anonymous volumes
    pub fn forced() -> Self {
        Self {
            force: true,
            remove_volumes: true,
        }
    }
}

/// Image information returned by an inspect call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInfo {
    pub id: String,
    pub tags: Vec<String>,
}

/// Container information returned by an inspect call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerDetails {
    pub id: String,
    pub name: String,
    pub image: String,
    pub status: ContainerStatus,
}

/// One container as reported by a runtime listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerObservation {
    pub id: String,
    /// Name as the runtime reports it, possibly with a leading `/`
    pub name: String,
    pub image: String,
    pub state: ContainerStatus,
    pub ports: Vec<ObservedPort>,
}

/// A progress message from an image pull
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PullProgress {
    pub id: Option<String>,
    pub status: Option<String>,
    pub progress: Option<String>,
}

/// Log stream type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStreamType {
    Stdout,
    Stderr,
}

/// A single chunk of container output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub stream: LogStreamType,
    pub message: String,
}

/// Pull progress stream type alias
pub type PullStream = Pin<Box<dyn Stream<Item = Result<PullProgress, RuntimeError>> + Send>>;

/// Log stream type alias
pub type LogStream = Pin<Box<dyn Stream<Item = Result<LogLine, RuntimeError>> + Send>>;
