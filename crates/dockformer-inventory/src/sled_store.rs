use async_trait::async_trait;
use chrono::Utc;
use dockformer_types::InventoryRecord;
use std::path::Path;
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::store::InventoryStore;

const RECORDS_TREE: &str = "containers";

/// Sled-backed inventory. One JSON document per record, keyed by name.
pub struct SledInventory {
    db: sled::Db,
    records: sled::Tree,
}

impl SledInventory {
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = sled::open(path.as_ref())?;
        let records = db.open_tree(RECORDS_TREE)?;
        debug!(path = %path.as_ref().display(), "Opened sled inventory");

        Ok(Self { db, records })
    }

    fn decode(bytes: &[u8]) -> Result<InventoryRecord> {
        Ok(serde_json::from_slice(bytes)?)
    }

    async fn flush(&self) -> Result<()> {
        self.db.flush_async().await?;
        Ok(())
    }
}

#[async_trait]
impl InventoryStore for SledInventory {
    async fn find_all(&self) -> Result<Vec<InventoryRecord>> {
        let mut result = Vec::new();
        for item in self.records.iter() {
            let (_, value) = item?;
            result.push(Self::decode(&value)?);
        }
        Ok(result)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<InventoryRecord>> {
        match self.records.get(name)? {
            Some(value) => Ok(Some(Self::decode(&value)?)),
            None => Ok(None),
        }
    }

    async fn create(&self, mut record: InventoryRecord) -> Result<InventoryRecord> {
        let now = Utc::now();
        // generate_id starts at zero; keep zero for "unassigned"
        record.id = self.db.generate_id()? + 1;
        record.created_at = now;
        record.updated_at = now;

        let serialized = serde_json::to_vec(&record)?;
        let swapped =
            self.records
                .compare_and_swap(record.name.as_str(), None::<&[u8]>, Some(serialized))?;
        if swapped.is_err() {
            return Err(StoreError::DuplicateName(record.name));
        }

        self.flush().await?;
        Ok(record)
    }

    async fn save(&self, mut record: InventoryRecord) -> Result<InventoryRecord> {
        let current = self
            .records
            .get(record.name.as_str())?
            .ok_or_else(|| StoreError::NotFound(record.name.clone()))?;
        let existing = Self::decode(&current)?;
        if existing.id != record.id {
            return Err(StoreError::NotFound(record.name));
        }

        record.created_at = existing.created_at;
        record.updated_at = Utc::now();

        let serialized = serde_json::to_vec(&record)?;
        let swapped = self.records.compare_and_swap(
            record.name.as_str(),
            Some(&current[..]),
            Some(serialized),
        )?;
        if swapped.is_err() {
            return Err(StoreError::Conflict(record.name));
        }

        self.flush().await?;
        Ok(record)
    }

    async fn delete(&self, record: &InventoryRecord) -> Result<()> {
        let current = self
            .records
            .get(record.name.as_str())?
            .ok_or_else(|| StoreError::NotFound(record.name.clone()))?;
        if Self::decode(&current)?.id != record.id {
            return Err(StoreError::NotFound(record.name.clone()));
        }

        let swapped = self.records.compare_and_swap(
            record.name.as_str(),
            Some(&current[..]),
            None::<Vec<u8>>,
        )?;
        if swapped.is_err() {
            return Err(StoreError::Conflict(record.name.clone()));
        }

        self.flush().await
    }
}
