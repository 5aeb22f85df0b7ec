//! In-memory runtime that keeps container state and records every call

#![allow(dead_code)]

use async_trait::async_trait;
use dockformer_runtime::{
    ContainerDetails, ContainerObservation, CreateContainerRequest, ImageInfo, LogLine, LogStream,
    LogStreamType, PullProgress, PullStream, RemoveOptions, Result, RuntimeClient, RuntimeError,
};
use dockformer_inventory::{InventoryStore, MemoryInventory, StoreError};
use dockformer_types::{ContainerStatus, InventoryRecord, ObservedPort};
use futures_util::stream;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};
use tokio::sync::{Notify, Semaphore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    InspectImage(String),
    PullImage(String),
    InspectContainer(String),
    Create(CreateContainerRequest),
    Start(String),
    Stop(String),
    Restart(String),
    Remove(String, RemoveOptions),
    List,
    Logs(String, Option<usize>),
}

#[derive(Debug, Clone)]
pub struct FakeContainer {
    pub id: String,
    pub image: String,
    pub status: ContainerStatus,
    pub ports: Vec<ObservedPort>,
}

#[derive(Default)]
struct State {
    images: HashSet<String>,
    containers: BTreeMap<String, FakeContainer>,
    calls: Vec<Call>,
    failing: HashSet<&'static str>,
    next_id: u64,
}

/// Holds `create_container` calls until released
pub struct Gate {
    entered: Notify,
    release: Semaphore,
}

impl Gate {
    fn closed() -> Self {
        Self {
            entered: Notify::new(),
            release: Semaphore::new(0),
        }
    }

    /// Wait until a create has reached the gate
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    /// Let every held and future create through
    pub fn open(&self) {
        self.release.add_permits(1 << 16);
    }
}

#[derive(Default)]
pub struct FakeRuntime {
    state: Mutex<State>,
    create_gate: Mutex<Option<Arc<Gate>>>,
}

impl FakeRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(self, reference: &str) -> Self {
        self.state.lock().unwrap().images.insert(reference.to_string());
        self
    }

    pub fn with_container(self, name: &str, image: &str, status: ContainerStatus) -> Self {
        self.with_published_container(name, image, status, vec![])
    }

    pub fn with_published_container(
        self,
        name: &str,
        image: &str,
        status: ContainerStatus,
        ports: Vec<ObservedPort>,
    ) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.next_id += 1;
            let id = format!("existing-{}", state.next_id);
            state.containers.insert(
                name.to_string(),
                FakeContainer {
                    id,
                    image: image.to_string(),
                    status,
                    ports,
                },
            );
        }
        self
    }

    /// Make every call of `operation` fail from now on
    pub fn fail(&self, operation: &'static str) {
        self.state.lock().unwrap().failing.insert(operation);
    }

    /// Hold every following create until the returned gate is opened
    pub fn hold_creates(&self) -> Arc<Gate> {
        let gate = Arc::new(Gate::closed());
        *self.create_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn recover(&self, operation: &'static str) {
        self.state.lock().unwrap().failing.remove(operation);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    pub fn creates(&self) -> Vec<CreateContainerRequest> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Create(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    pub fn removes(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::Remove(..)))
            .count()
    }

    pub fn container(&self, name: &str) -> Option<FakeContainer> {
        self.state.lock().unwrap().containers.get(name).cloned()
    }

    pub fn container_count(&self) -> usize {
        self.state.lock().unwrap().containers.len()
    }

    pub fn has_image(&self, reference: &str) -> bool {
        self.state.lock().unwrap().images.contains(reference)
    }

    /// Record `call` and fail if `operation` was marked failing
    fn enter(&self, operation: &'static str, call: Call) -> Result<std::sync::MutexGuard<'_, State>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        if state.failing.contains(operation) {
            return Err(RuntimeError::operation_failed(operation, "injected failure"));
        }
        Ok(state)
    }

    fn set_status(&self, operation: &'static str, call: Call, name: &str, status: ContainerStatus) -> Result<()> {
        let mut state = self.enter(operation, call)?;
        let container = state
            .containers
            .get_mut(name)
            .ok_or_else(|| RuntimeError::ContainerNotFound(name.to_string()))?;
        container.status = status;
        Ok(())
    }
}

#[async_trait]
impl RuntimeClient for FakeRuntime {
    async fn inspect_image(&self, reference: &str) -> Result<Option<ImageInfo>> {
        let state = self.enter("inspect_image", Call::InspectImage(reference.to_string()))?;
        Ok(state.images.contains(reference).then(|| ImageInfo {
            id: format!("sha256:{}", reference),
            tags: vec![reference.to_string()],
        }))
    }

    async fn pull_image(&self, reference: &str) -> Result<PullStream> {
        let mut state = self.enter("pull_image", Call::PullImage(reference.to_string()))?;
        if state.failing.contains("pull_stream") {
            let items = vec![
                Ok(PullProgress {
                    id: Some("layer".into()),
                    status: Some("Downloading".into()),
                    progress: None,
                }),
                Err(RuntimeError::StreamError("manifest unknown".into())),
            ];
            return Ok(Box::pin(stream::iter(items)));
        }

        state.images.insert(reference.to_string());
        let items = vec![Ok(PullProgress {
            id: None,
            status: Some(format!("Downloaded newer image for {}", reference)),
            progress: None,
        })];
        Ok(Box::pin(stream::iter(items)))
    }

    async fn inspect_container(&self, name: &str) -> Result<Option<ContainerDetails>> {
        let state = self.enter("inspect_container", Call::InspectContainer(name.to_string()))?;
        Ok(state.containers.get(name).map(|c| ContainerDetails {
            id: c.id.clone(),
            name: name.to_string(),
            image: c.image.clone(),
            status: c.status.clone(),
        }))
    }

    async fn create_container(&self, request: CreateContainerRequest) -> Result<String> {
        let gate = self.create_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.entered.notify_one();
            let _permit = gate.release.acquire().await.unwrap();
        }

        let mut state = self.enter("create_container", Call::Create(request.clone()))?;
        if state.containers.contains_key(&request.name) {
            return Err(RuntimeError::operation_failed(
                "create_container",
                format!("Conflict. The container name \"/{}\" is already in use", request.name),
            ));
        }

        state.next_id += 1;
        let id = format!("fake-{}", state.next_id);
        let ports = request
            .ports
            .iter()
            .map(|(key, host)| ObservedPort {
                private_port: key.port,
                public_port: *host,
                protocol: Some(key.protocol),
            })
            .collect();
        state.containers.insert(
            request.name.clone(),
            FakeContainer {
                id: id.clone(),
                image: request.image.clone(),
                status: ContainerStatus::Created,
                ports,
            },
        );
        // The daemon accepted the container but a later step of the call failed
        if state.failing.contains("create_after_accept") {
            return Err(RuntimeError::operation_failed(
                "connect_network",
                "network backend not found",
            ));
        }
        Ok(id)
    }

    async fn start_container(&self, name: &str) -> Result<()> {
        self.set_status("start_container", Call::Start(name.to_string()), name, ContainerStatus::Running)
    }

    async fn stop_container(&self, name: &str) -> Result<()> {
        self.set_status("stop_container", Call::Stop(name.to_string()), name, ContainerStatus::Exited)
    }

    async fn restart_container(&self, name: &str) -> Result<()> {
        self.set_status("restart_container", Call::Restart(name.to_string()), name, ContainerStatus::Running)
    }

    async fn remove_container(&self, name: &str, options: RemoveOptions) -> Result<()> {
        let mut state = self.enter("remove_container", Call::Remove(name.to_string(), options))?;
        state
            .containers
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| RuntimeError::ContainerNotFound(name.to_string()))
    }

    async fn list_containers(&self, all: bool) -> Result<Vec<ContainerObservation>> {
        let state = self.enter("list_containers", Call::List)?;
        Ok(state
            .containers
            .iter()
            .filter(|(_, c)| all || c.status.is_running())
            .map(|(name, c)| ContainerObservation {
                id: c.id.clone(),
                name: format!("/{}", name),
                image: c.image.clone(),
                state: c.status.clone(),
                ports: c.ports.clone(),
            })
            .collect())
    }

    async fn stream_logs(&self, name: &str, tail: Option<usize>) -> Result<LogStream> {
        let state = self.enter("stream_logs", Call::Logs(name.to_string(), tail))?;
        if !state.containers.contains_key(name) {
            return Err(RuntimeError::ContainerNotFound(name.to_string()));
        }

        let lines = vec![
            Ok(LogLine {
                stream: LogStreamType::Stdout,
                message: format!("{} ready", name),
            }),
            Ok(LogLine {
                stream: LogStreamType::Stderr,
                message: "warning: low memory".to_string(),
            }),
        ];
        Ok(Box::pin(stream::iter(lines)))
    }
}

/// Engine over `runtime` and a fresh in-memory inventory
pub fn engine_with(
    runtime: &std::sync::Arc<FakeRuntime>,
) -> (dockformer_engine::Engine, std::sync::Arc<dockformer_inventory::MemoryInventory>) {
    let store = std::sync::Arc::new(dockformer_inventory::MemoryInventory::new());
    let engine = dockformer_engine::Engine::new(runtime.clone(), store.clone());
    (engine, store)
}

#[derive(Debug, Clone, Copy)]
pub enum WriteFault {
    Fail,
    Panic,
}

/// In-memory inventory whose writes can be made to fail per name
#[derive(Default)]
pub struct FlakyInventory {
    inner: MemoryInventory,
    faults: Mutex<HashMap<String, WriteFault>>,
}

impl FlakyInventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inner(&self) -> &MemoryInventory {
        &self.inner
    }

    pub fn fault(&self, name: &str, fault: WriteFault) {
        self.faults.lock().unwrap().insert(name.to_string(), fault);
    }

    fn check(&self, name: &str) -> dockformer_inventory::Result<()> {
        let fault = self.faults.lock().unwrap().get(name).copied();
        match fault {
            None => Ok(()),
            Some(WriteFault::Fail) => Err(StoreError::Conflict(name.to_string())),
            Some(WriteFault::Panic) => panic!("inventory write for {} blew up", name),
        }
    }
}

#[async_trait]
impl InventoryStore for FlakyInventory {
    async fn find_all(&self) -> dockformer_inventory::Result<Vec<InventoryRecord>> {
        self.inner.find_all().await
    }

    async fn find_by_name(&self, name: &str) -> dockformer_inventory::Result<Option<InventoryRecord>> {
        self.inner.find_by_name(name).await
    }

    async fn create(&self, record: InventoryRecord) -> dockformer_inventory::Result<InventoryRecord> {
        self.check(&record.name)?;
        self.inner.create(record).await
    }

    async fn save(&self, record: InventoryRecord) -> dockformer_inventory::Result<InventoryRecord> {
        self.check(&record.name)?;
        self.inner.save(record).await
    }

    async fn delete(&self, record: &InventoryRecord) -> dockformer_inventory::Result<()> {
        self.check(&record.name)?;
        self.inner.delete(record).await
    }
}
