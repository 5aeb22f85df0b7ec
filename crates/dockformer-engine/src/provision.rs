//! Provisioning: make exactly one runtime container match a spec

use dockformer_runtime::{CreateContainerRequest, RemoveOptions, RuntimeClient};
use dockformer_types::ContainerSpec;
use futures_util::StreamExt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{EngineError, Result};
use crate::ports::resolve_ports;

/// Drives the runtime calls for a single `provision`.
///
/// Holds no locks of its own; callers serialize by name.
#[derive(Clone)]
pub struct Provisioner {
    runtime: Arc<dyn RuntimeClient>,
}

impl Provisioner {
    pub fn new(runtime: Arc<dyn RuntimeClient>) -> Self {
        Self { runtime }
    }

    /// Create a fresh container for `spec`, replacing any container that
    /// already has its name. Returns the runtime-assigned id.
    ///
    /// Replacement is remove-then-create: if create fails after the old
    /// container was removed, no container with this name is left.
    pub async fn provision(&self, spec: &ContainerSpec) -> Result<String> {
        spec.validate()?;

        let ports = resolve_ports(&spec.ports).map_err(|source| EngineError::InvalidPortMapping {
            name: spec.name.clone(),
            source,
        })?;

        self.ensure_image(spec).await?;

        let replaced = self.clear_name(&spec.name).await?;

        let request = CreateContainerRequest {
            name: spec.name.clone(),
            image: spec.image.clone(),
            env: spec.env_entries(),
            ports,
            command: spec.command_args(),
            binds: spec.volumes.clone(),
            networks: spec.networks.clone(),
        };

        let id = match self.runtime.create_container(request).await {
            Ok(id) => id,
            Err(source) => {
                if replaced {
                    warn!(name = %spec.name, "Create failed after removing the previous container");
                }
                self.discard_partial(&spec.name).await;
                return Err(EngineError::runtime(&spec.name, "create", source));
            }
        };

        info!(name = %spec.name, id = %id, replaced, "Container provisioned");
        Ok(id)
    }

    async fn ensure_image(&self, spec: &ContainerSpec) -> Result<()> {
        match self.runtime.inspect_image(&spec.image).await {
            Ok(Some(_)) => return Ok(()),
            Ok(None) => {}
            Err(e) => {
                warn!(image = %spec.image, error = %e, "Image inspect failed, pulling anyway");
            }
        }

        info!(name = %spec.name, image = %spec.image, "Pulling image");
        let pull_failed = |source| EngineError::ImagePullFailed {
            name: spec.name.clone(),
            image: spec.image.clone(),
            source,
        };

        let mut progress = self.runtime.pull_image(&spec.image).await.map_err(pull_failed)?;
        while let Some(item) = progress.next().await {
            let item = item.map_err(pull_failed)?;
            if let Some(status) = item.status {
                debug!(image = %spec.image, layer = ?item.id, "{}", status);
            }
        }

        Ok(())
    }

    /// A create can fail after the daemon accepted the container. Remove
    /// whatever is left under `name` so a failed provision leaves it absent.
    async fn discard_partial(&self, name: &str) {
        match self.runtime.inspect_container(name).await {
            Ok(None) => {}
            Ok(Some(leftover)) => {
                warn!(name, id = %leftover.id, "Removing container left behind by a failed create");
                if let Err(e) = self.runtime.remove_container(name, RemoveOptions::forced()).await {
                    if !e.is_not_found() {
                        warn!(name, error = %e, "Failed to remove partially created container");
                    }
                }
            }
            Err(e) if e.is_not_found() => {}
            Err(e) => warn!(name, error = %e, "Could not check for a partially created container"),
        }
    }

    /// Remove a container already holding `name`. Returns whether one
    /// was removed.
    async fn clear_name(&self, name: &str) -> Result<bool> {
        let replace_failed = |source| EngineError::ReplaceFailed {
            name: name.to_owned(),
            source,
        };

        let existing = match self.runtime.inspect_container(name).await {
            Ok(existing) => existing,
            Err(e) if e.is_not_found() => None,
            Err(e) => return Err(replace_failed(e)),
        };

        let Some(existing) = existing else {
            return Ok(false);
        };

        info!(name, id = %existing.id, "Removing existing container before re-creating it");
        match self.runtime.remove_container(name, RemoveOptions::forced()).await {
            Ok(()) => Ok(true),
            // Gone between inspect and remove
            Err(e) if e.is_not_found() => Ok(true),
            Err(e) => Err(replace_failed(e)),
        }
    }
}
