//! Reconciliation of the inventory against the runtime's container list

use dockformer_runtime::ContainerObservation;
use dockformer_types::{summarize_ports, InventoryRecord};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::engine::Engine;
use crate::error::{EngineError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    /// Period of the supervisor loop
    pub interval_seconds: u64,
    /// Per-name updates running at once within one pass
    pub max_concurrent: usize,
    /// Names starting with any of these belong to infrastructure
    pub skip_prefixes: Vec<String>,
    /// Exact infrastructure names
    pub skip_names: Vec<String>,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 30,
            max_concurrent: 8,
            skip_prefixes: vec!["k8s_".to_string()],
            skip_names: vec!["POD".to_string()],
        }
    }
}

impl ReconcileConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds.max(1))
    }

    /// Whether a runtime container is infrastructure rather than user-managed
    pub fn is_skipped(&self, name: &str) -> bool {
        self.skip_names.iter().any(|skip| skip == name)
            || self
                .skip_prefixes
                .iter()
                .any(|prefix| name.starts_with(prefix.as_str()))
    }
}

/// Outcome of one reconciliation pass
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReconcileReport {
    /// Existing records overwritten from observations
    pub updated: Vec<String>,
    /// Records created for untracked runtime containers
    pub created: Vec<String>,
    pub skipped: Vec<String>,
    /// Names whose record could not be written, with the error
    pub failed: BTreeMap<String, String>,
    /// Records with no runtime container; left untouched
    pub unobserved: Vec<String>,
    pub duration: Duration,
}

impl ReconcileReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Applied {
    Updated,
    Created,
}

/// Runtime container name without the leading `/` the daemon adds
pub fn logical_name(raw: &str) -> &str {
    raw.strip_prefix('/').unwrap_or(raw)
}

impl Engine {
    /// Bring the inventory in line with the runtime.
    ///
    /// A failed listing aborts before anything is written. Per-record
    /// write failures are collected in the report and do not stop the
    /// pass. Records the runtime does not report are never deleted.
    pub async fn reconcile(&self) -> Result<ReconcileReport> {
        let start_time = Instant::now();
        let mut report = ReconcileReport::default();

        let observed = self
            .runtime
            .list_containers(true)
            .await
            .map_err(EngineError::ListFailed)?;
        let records = self
            .store
            .find_all()
            .await
            .map_err(EngineError::InventoryLoadFailed)?;

        let mut unmatched: HashMap<String, InventoryRecord> = records
            .into_iter()
            .map(|record| (record.name.clone(), record))
            .collect();

        let mut pending = Vec::new();
        for observation in observed {
            let name = logical_name(&observation.name).to_owned();
            if self.reconcile_config.is_skipped(&name) {
                debug!(name = %name, "Skipping infrastructure container");
                report.skipped.push(name);
                continue;
            }
            unmatched.remove(&name);
            pending.push((name, observation));
        }

        report.unobserved = unmatched.into_keys().collect();
        report.unobserved.sort();
        for name in &report.unobserved {
            warn!(name = %name, "Inventory record has no runtime container");
        }

        let semaphore = Arc::new(Semaphore::new(self.reconcile_config.max_concurrent.max(1)));
        let mut tasks = JoinSet::new();

        for (name, observation) in pending {
            let engine = self.clone();
            let permit = semaphore.clone();

            tasks.spawn(async move {
                let _permit = permit.acquire().await;
                let outcome = engine.apply_observation(&name, observation).await;
                (name, outcome)
            });
        }

        let mut lost_tasks = 0usize;
        while let Some(task_result) = tasks.join_next().await {
            match task_result {
                Ok((name, Ok(Applied::Updated))) => report.updated.push(name),
                Ok((name, Ok(Applied::Created))) => report.created.push(name),
                Ok((name, Err(e))) => {
                    warn!(name = %name, error = %e, "Failed to reconcile record");
                    report.failed.insert(name, e.to_string());
                }
                Err(join_error) => {
                    // The record's name is lost with the task
                    lost_tasks += 1;
                    let key = format!("task-{}", lost_tasks);
                    warn!(task = %key, error = %join_error, "Reconcile task did not complete");
                    report.failed.insert(key, format!("Task join error: {}", join_error));
                }
            }
        }

        report.updated.sort();
        report.created.sort();
        report.skipped.sort();
        report.duration = start_time.elapsed();

        info!(
            updated = report.updated.len(),
            created = report.created.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            unobserved = report.unobserved.len(),
            duration = ?report.duration,
            "Reconciliation finished"
        );
        Ok(report)
    }

    /// Write one observation into the inventory under the name's lock.
    /// The record is re-read so a concurrent apply is not overwritten
    /// with stale fields.
    async fn apply_observation(&self, name: &str, observation: ContainerObservation) -> Result<Applied> {
        let _guard = self.locks.acquire(name).await;

        let current = self
            .store
            .find_by_name(name)
            .await
            .map_err(|e| EngineError::store(name, e))?;
        let ports = summarize_ports(&observation.ports);

        match current {
            Some(mut record) => {
                record.status = observation.state;
                record.image = observation.image;
                record.ports = ports;
                if record.runtime_id.is_empty() {
                    record.runtime_id = observation.id;
                }
                self.store
                    .save(record)
                    .await
                    .map_err(|e| EngineError::store(name, e))?;
                Ok(Applied::Updated)
            }
            None => {
                let record = InventoryRecord::new(name, &observation.image)
                    .with_ports(&ports)
                    .with_runtime_id(&observation.id)
                    .with_status(observation.state);
                self.store
                    .create(record)
                    .await
                    .map_err(|e| EngineError::store(name, e))?;
                Ok(Applied::Created)
            }
        }
    }
}
