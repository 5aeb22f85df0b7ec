//! Lifecycle failure paths against a strict mock runtime: any call the
//! test did not expect fails the test.

use async_trait::async_trait;
use dockformer_engine::{Engine, EngineError};
use dockformer_inventory::{InventoryStore, MemoryInventory};
use dockformer_runtime::{
    ContainerDetails, ContainerObservation, CreateContainerRequest, ImageInfo, LogStream,
    PullStream, RemoveOptions, Result, RuntimeClient, RuntimeError,
};
use dockformer_types::{ContainerSpec, ContainerStatus, InventoryRecord};
use mockall::mock;
use std::sync::Arc;

mock! {
    pub Runtime {}

    #[async_trait]
    impl RuntimeClient for Runtime {
        async fn inspect_image(&self, reference: &str) -> Result<Option<ImageInfo>>;
        async fn pull_image(&self, reference: &str) -> Result<PullStream>;
        async fn inspect_container(&self, name: &str) -> Result<Option<ContainerDetails>>;
        async fn create_container(&self, request: CreateContainerRequest) -> Result<String>;
        async fn start_container(&self, name: &str) -> Result<()>;
        async fn stop_container(&self, name: &str) -> Result<()>;
        async fn restart_container(&self, name: &str) -> Result<()>;
        async fn remove_container(&self, name: &str, options: RemoveOptions) -> Result<()>;
        async fn list_containers(&self, all: bool) -> Result<Vec<ContainerObservation>>;
        async fn stream_logs(&self, name: &str, tail: Option<usize>) -> Result<LogStream>;
    }
}

async fn engine_with_record(
    runtime: MockRuntime,
    status: ContainerStatus,
) -> (Engine, Arc<MemoryInventory>, InventoryRecord) {
    let store = Arc::new(MemoryInventory::new());
    let record = store
        .create(
            InventoryRecord::new("web", "nginx:1.25")
                .with_runtime_id("abc123")
                .with_status(status),
        )
        .await
        .unwrap();
    (Engine::new(Arc::new(runtime), store.clone()), store, record)
}

#[tokio::test]
async fn test_start_calls_runtime_once() {
    let mut runtime = MockRuntime::new();
    runtime
        .expect_start_container()
        .withf(|name| name == "web")
        .times(1)
        .returning(|_| Ok(()));
    let (engine, store, _) = engine_with_record(runtime, ContainerStatus::Stopped).await;

    engine.start("web").await.unwrap();

    let stored = store.find_by_name("web").await.unwrap().unwrap();
    assert_eq!(stored.status, ContainerStatus::Running);
}

#[tokio::test]
async fn test_failed_stop_keeps_record() {
    let mut runtime = MockRuntime::new();
    runtime
        .expect_stop_container()
        .times(1)
        .returning(|_| Err(RuntimeError::operation_failed("stop", "daemon busy")));
    let (engine, store, before) = engine_with_record(runtime, ContainerStatus::Running).await;

    let err = engine.stop("web").await.unwrap_err();

    assert!(matches!(err, EngineError::RuntimeOperationFailed { operation: "stop", .. }));
    assert_eq!(store.find_by_name("web").await.unwrap().unwrap(), before);
}

#[tokio::test]
async fn test_failed_restart_reports_cause() {
    let mut runtime = MockRuntime::new();
    runtime
        .expect_restart_container()
        .times(1)
        .returning(|name| Err(RuntimeError::ContainerNotFound(name.to_string())));
    let (engine, store, before) = engine_with_record(runtime, ContainerStatus::Exited).await;

    match engine.restart("web").await.unwrap_err() {
        EngineError::RuntimeOperationFailed { name, operation, source } => {
            assert_eq!(name, "web");
            assert_eq!(operation, "restart");
            assert!(source.is_not_found());
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(store.find_by_name("web").await.unwrap().unwrap().status, before.status);
}

#[tokio::test]
async fn test_remove_is_forced_and_always_deletes_record() {
    let mut runtime = MockRuntime::new();
    runtime
        .expect_remove_container()
        .withf(|name, options| name == "web" && *options == RemoveOptions::forced())
        .times(1)
        .returning(|_, _| {
            Err(RuntimeError::ConnectionError {
                message: "connection refused".into(),
            })
        });
    let (engine, store, _) = engine_with_record(runtime, ContainerStatus::Running).await;

    engine.remove("web").await.unwrap();

    assert!(store.find_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_inspect_not_found_counts_as_absent() {
    let mut runtime = MockRuntime::new();
    runtime.expect_inspect_image().times(1).returning(|reference| {
        Ok(Some(ImageInfo {
            id: "sha256:1".into(),
            tags: vec![reference.to_string()],
        }))
    });
    runtime
        .expect_inspect_container()
        .times(1)
        .returning(|name| Err(RuntimeError::ContainerNotFound(name.to_string())));
    runtime.expect_remove_container().never();
    runtime
        .expect_create_container()
        .withf(|request| request.name == "web" && request.ports.is_empty())
        .times(1)
        .returning(|_| Ok("fresh".to_string()));

    let store = Arc::new(MemoryInventory::new());
    let engine = Engine::new(Arc::new(runtime), store);

    let id = engine
        .provision(&ContainerSpec::new("web", "nginx:1.25"))
        .await
        .unwrap();
    assert_eq!(id, "fresh");
}
