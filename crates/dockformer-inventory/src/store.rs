use async_trait::async_trait;
use dockformer_types::InventoryRecord;
use std::sync::Arc;

use crate::config::{InventoryBackend, InventoryConfig};
use crate::error::Result;
use crate::memory::MemoryInventory;
use crate::sled_store::SledInventory;

/// Keyed record repository for tracked containers.
///
/// The key is the record's logical name and is immutable. Backends own
/// `id`, `created_at` and `updated_at`; whatever the caller puts in
/// those fields is overwritten.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// All records, ordered by name
    async fn find_all(&self) -> Result<Vec<InventoryRecord>>;

    async fn find_by_name(&self, name: &str) -> Result<Option<InventoryRecord>>;

    /// Insert a new record and return it with its assigned id.
    /// Fails with `DuplicateName` if the name is taken.
    async fn create(&self, record: InventoryRecord) -> Result<InventoryRecord>;

    /// Overwrite an existing record, matched by name and id
    async fn save(&self, record: InventoryRecord) -> Result<InventoryRecord>;

    async fn delete(&self, record: &InventoryRecord) -> Result<()>;
}

/// Open the backend selected by `config`
pub async fn open_inventory(config: &InventoryConfig) -> Result<Arc<dyn InventoryStore>> {
    match config.backend {
        InventoryBackend::Sled => Ok(Arc::new(SledInventory::open(&config.path).await?)),
        InventoryBackend::Memory => Ok(Arc::new(MemoryInventory::new())),
    }
}
