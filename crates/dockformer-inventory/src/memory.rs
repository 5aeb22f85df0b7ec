use async_trait::async_trait;
use chrono::Utc;
use dockformer_types::InventoryRecord;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{Result, StoreError};
use crate::store::InventoryStore;

/// In-memory inventory, used by tests and `backend = "memory"`
#[derive(Debug, Clone)]
pub struct MemoryInventory {
    records: Arc<RwLock<BTreeMap<String, InventoryRecord>>>,
    next_id: Arc<AtomicU64>,
}

impl MemoryInventory {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(BTreeMap::new())),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }
}

impl Default for MemoryInventory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InventoryStore for MemoryInventory {
    async fn find_all(&self) -> Result<Vec<InventoryRecord>> {
        let records = self.records.read().await;
        Ok(records.values().cloned().collect())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<InventoryRecord>> {
        let records = self.records.read().await;
        Ok(records.get(name).cloned())
    }

    async fn create(&self, mut record: InventoryRecord) -> Result<InventoryRecord> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.name) {
            return Err(StoreError::DuplicateName(record.name));
        }

        let now = Utc::now();
        record.id = self.next_id.fetch_add(1, Ordering::SeqCst);
        record.created_at = now;
        record.updated_at = now;
        records.insert(record.name.clone(), record.clone());
        Ok(record)
    }

    async fn save(&self, mut record: InventoryRecord) -> Result<InventoryRecord> {
        let mut records = self.records.write().await;
        let existing = records
            .get_mut(&record.name)
            .filter(|existing| existing.id == record.id)
            .ok_or_else(|| StoreError::NotFound(record.name.clone()))?;

        record.created_at = existing.created_at;
        record.updated_at = Utc::now();
        *existing = record.clone();
        Ok(record)
    }

    async fn delete(&self, record: &InventoryRecord) -> Result<()> {
        let mut records = self.records.write().await;
        match records.get(&record.name) {
            Some(existing) if existing.id == record.id => {
                records.remove(&record.name);
                Ok(())
            }
            _ => Err(StoreError::NotFound(record.name.clone())),
        }
    }
}
