pub mod container;
pub mod error;
pub mod logs;

pub use container::DockerRuntime;
pub use error::{DockerError, Result};
