use dockformer_inventory::{open_inventory, InventoryBackend, InventoryConfig, StoreError};
use dockformer_types::{ContainerStatus, InventoryRecord};
use tempfile::tempdir;

#[tokio::test]
async fn test_open_memory_backend() {
    let store = open_inventory(&InventoryConfig::memory()).await.unwrap();

    store.create(InventoryRecord::new("web", "nginx")).await.unwrap();
    assert_eq!(store.find_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_open_sled_backend() {
    let temp_dir = tempdir().unwrap();
    let config = InventoryConfig::sled(temp_dir.path().join("inventory"));
    assert_eq!(config.backend, InventoryBackend::Sled);

    let store = open_inventory(&config).await.unwrap();
    let created = store
        .create(InventoryRecord::new("web", "nginx").with_status(ContainerStatus::Running))
        .await
        .unwrap();

    let found = store.find_by_name("web").await.unwrap().unwrap();
    assert_eq!(found.id, created.id);
    assert_eq!(found.status, ContainerStatus::Running);
}

#[tokio::test]
async fn test_backends_agree_on_duplicate_names() {
    let temp_dir = tempdir().unwrap();
    for config in [
        InventoryConfig::memory(),
        InventoryConfig::sled(temp_dir.path().join("dup")),
    ] {
        let store = open_inventory(&config).await.unwrap();
        store.create(InventoryRecord::new("web", "nginx")).await.unwrap();
        let result = store.create(InventoryRecord::new("web", "nginx")).await;
        assert!(matches!(result, Err(StoreError::DuplicateName(_))));
    }
}

#[test]
fn test_config_from_toml() {
    let config: InventoryConfig = toml::from_str("backend = \"memory\"").unwrap();
    assert_eq!(config.backend, InventoryBackend::Memory);
    assert_eq!(config.path, InventoryConfig::default().path);
}
