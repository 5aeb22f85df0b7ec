//! Engine operations: apply, lifecycle, reads and record updates

use dockformer_inventory::{InventoryStore, StoreError};
use dockformer_runtime::{LogStream, RemoveOptions, RuntimeClient, RuntimeConfig};
use dockformer_types::{ContainerSpec, ContainerStatus, ContainersDocument, InventoryRecord};
use futures_util::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{EngineError, Result};
use crate::locks::NameLocks;
use crate::ports::resolve_ports;
use crate::provision::Provisioner;
use crate::reconcile::ReconcileConfig;

/// Engine tuning
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Bound on the single inspect made per record when refreshing status
    pub refresh_timeout: Duration,
    /// Lines returned by `logs` when the caller gives no tail
    pub default_log_tail: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            refresh_timeout: Duration::from_millis(2000),
            default_log_tail: 100,
        }
    }
}

impl EngineConfig {
    pub fn from_runtime_config(config: &RuntimeConfig) -> Self {
        Self {
            refresh_timeout: config.inspect_timeout(),
            ..Default::default()
        }
    }
}

/// Stored fields an operator may overwrite without touching the runtime
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordUpdate {
    pub image: Option<String>,
    pub ports: Option<String>,
}

#[derive(Debug, Clone, Copy)]
enum Transition {
    Start,
    Stop,
    Restart,
}

impl Transition {
    fn operation(self) -> &'static str {
        match self {
            Transition::Start => "start",
            Transition::Stop => "stop",
            Transition::Restart => "restart",
        }
    }

    fn status(self) -> ContainerStatus {
        match self {
            Transition::Stop => ContainerStatus::Stopped,
            Transition::Start | Transition::Restart => ContainerStatus::Running,
        }
    }
}

/// Provisioning and lifecycle front end.
///
/// Cloning is cheap and clones share the same name locks.
#[derive(Clone)]
pub struct Engine {
    pub(crate) runtime: Arc<dyn RuntimeClient>,
    pub(crate) store: Arc<dyn InventoryStore>,
    pub(crate) locks: NameLocks,
    pub(crate) reconcile_config: ReconcileConfig,
    provisioner: Provisioner,
    config: EngineConfig,
}

impl Engine {
    pub fn new(runtime: Arc<dyn RuntimeClient>, store: Arc<dyn InventoryStore>) -> Self {
        Self {
            provisioner: Provisioner::new(runtime.clone()),
            runtime,
            store,
            locks: NameLocks::new(),
            reconcile_config: ReconcileConfig::default(),
            config: EngineConfig::default(),
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_reconcile_config(mut self, config: ReconcileConfig) -> Self {
        self.reconcile_config = config;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn reconcile_config(&self) -> &ReconcileConfig {
        &self.reconcile_config
    }

    /// Provision `spec` without touching the inventory
    pub async fn provision(&self, spec: &ContainerSpec) -> Result<String> {
        let _guard = self.locks.acquire(&spec.name).await;
        self.provisioner.provision(spec).await
    }

    /// Provision `spec` and record the result.
    ///
    /// The record for `spec.name` is created, or updated in place, with
    /// the new runtime id and status `created`.
    pub async fn apply(&self, spec: &ContainerSpec) -> Result<InventoryRecord> {
        let _guard = self.locks.acquire(&spec.name).await;
        let runtime_id = self.provisioner.provision(spec).await?;

        let existing = self
            .store
            .find_by_name(&spec.name)
            .await
            .map_err(|e| EngineError::store(&spec.name, e))?;

        let result = match existing {
            Some(mut record) => {
                record.image = spec.image.clone();
                record.ports = spec.ports.clone();
                record.runtime_id = runtime_id;
                record.status = ContainerStatus::Created;
                self.store.save(record).await
            }
            None => {
                let record = InventoryRecord::new(&spec.name, &spec.image)
                    .with_ports(&spec.ports)
                    .with_runtime_id(&runtime_id);
                self.store.create(record).await
            }
        };

        result.map_err(|e| EngineError::store(&spec.name, e))
    }

    /// Apply every spec in order, stopping at the first failure
    pub async fn apply_document(&self, document: &ContainersDocument) -> Result<Vec<InventoryRecord>> {
        document.validate()?;

        let mut applied = Vec::with_capacity(document.len());
        for spec in &document.containers {
            applied.push(self.apply(spec).await?);
        }
        Ok(applied)
    }

    pub async fn start(&self, name: &str) -> Result<InventoryRecord> {
        self.transition(name, Transition::Start).await
    }

    pub async fn stop(&self, name: &str) -> Result<InventoryRecord> {
        self.transition(name, Transition::Stop).await
    }

    pub async fn restart(&self, name: &str) -> Result<InventoryRecord> {
        self.transition(name, Transition::Restart).await
    }

    /// Run a lifecycle call; the record is only saved if it succeeds
    async fn transition(&self, name: &str, transition: Transition) -> Result<InventoryRecord> {
        let _guard = self.locks.acquire(name).await;
        let mut record = self.find_record(name).await?;
        let operation = transition.operation();

        let outcome = match transition {
            Transition::Start => self.runtime.start_container(&record.name).await,
            Transition::Stop => self.runtime.stop_container(&record.name).await,
            Transition::Restart => self.runtime.restart_container(&record.name).await,
        };
        outcome.map_err(|e| EngineError::runtime(name, operation, e))?;

        record.status = transition.status();
        let record = self
            .store
            .save(record)
            .await
            .map_err(|e| EngineError::store(name, e))?;

        info!(name, operation, status = %record.status, "Container state changed");
        Ok(record)
    }

    /// Remove the runtime container and delete its record.
    ///
    /// The record is deleted even when the runtime removal fails.
    pub async fn remove(&self, name: &str) -> Result<()> {
        let _guard = self.locks.acquire(name).await;
        let record = self.find_record(name).await?;

        if let Err(e) = self
            .runtime
            .remove_container(&record.name, RemoveOptions::forced())
            .await
        {
            warn!(name, error = %e, "Runtime removal failed, deleting record anyway");
        }

        self.store
            .delete(&record)
            .await
            .map_err(|e| EngineError::store(name, e))?;

        info!(name, "Container removed");
        Ok(())
    }

    /// All records, each with its status refreshed from the runtime
    pub async fn list(&self) -> Result<Vec<InventoryRecord>> {
        let records = self
            .store
            .find_all()
            .await
            .map_err(EngineError::InventoryLoadFailed)?;

        Ok(join_all(records.into_iter().map(|r| self.refresh_status(r))).await)
    }

    /// One record with its status refreshed from the runtime
    pub async fn get(&self, name: &str) -> Result<InventoryRecord> {
        let record = self.find_record(name).await?;
        Ok(self.refresh_status(record).await)
    }

    /// Output of the container behind `name`
    pub async fn logs(&self, name: &str, tail: Option<usize>) -> Result<LogStream> {
        let record = self.find_record(name).await?;
        let tail = tail.unwrap_or(self.config.default_log_tail);

        self.runtime
            .stream_logs(&record.name, Some(tail))
            .await
            .map_err(|e| EngineError::runtime(name, "logs", e))
    }

    /// Overwrite stored fields of an existing record. The runtime is not
    /// contacted.
    pub async fn update_record(&self, name: &str, update: RecordUpdate) -> Result<InventoryRecord> {
        if let Some(ports) = &update.ports {
            resolve_ports(ports).map_err(|source| EngineError::InvalidPortMapping {
                name: name.to_owned(),
                source,
            })?;
        }

        let _guard = self.locks.acquire(name).await;
        let mut record = self.find_record(name).await?;

        if let Some(image) = update.image {
            record.image = image;
        }
        if let Some(ports) = update.ports {
            record.ports = ports;
        }

        self.store
            .save(record)
            .await
            .map_err(|e| EngineError::store(name, e))
    }

    pub(crate) async fn find_record(&self, name: &str) -> Result<InventoryRecord> {
        match self.store.find_by_name(name).await {
            Ok(Some(record)) => Ok(record),
            Ok(None) => Err(EngineError::NotFound(name.to_owned())),
            Err(StoreError::NotFound(_)) => Err(EngineError::NotFound(name.to_owned())),
            Err(e) => Err(EngineError::store(name, e)),
        }
    }

    /// Overwrite the returned view's status with a fresh observation.
    /// Nothing is persisted; any failure keeps the stored status.
    async fn refresh_status(&self, mut record: InventoryRecord) -> InventoryRecord {
        let inspect = self.runtime.inspect_container(&record.name);
        match tokio::time::timeout(self.config.refresh_timeout, inspect).await {
            Ok(Ok(Some(details))) => record.status = details.status,
            Ok(Ok(None)) => {
                debug!(name = %record.name, "No runtime container, keeping stored status");
            }
            Ok(Err(e)) => {
                warn!(name = %record.name, error = %e, "Status refresh failed");
            }
            Err(_) => {
                warn!(name = %record.name, timeout = ?self.config.refresh_timeout, "Status refresh timed out");
            }
        }
        record
    }
}
