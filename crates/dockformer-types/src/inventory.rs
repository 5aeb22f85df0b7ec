//! The persisted inventory record

use crate::container::ContainerStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One tracked container.
///
/// `id` and the timestamps are owned by the inventory store; callers
/// build records with `InventoryRecord::new` and let the store assign
/// them on create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub id: u64,
    pub name: String,
    pub image: String,
    pub ports: String,
    /// Runtime-assigned container id; empty until first provisioned
    #[serde(default)]
    pub runtime_id: String,
    pub status: ContainerStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InventoryRecord {
    pub fn new(name: &str, image: &str) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            name: name.to_owned(),
            image: image.to_owned(),
            ports: String::new(),
            runtime_id: String::new(),
            status: ContainerStatus::Created,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_ports(mut self, ports: &str) -> Self {
        self.ports = ports.to_owned();
        self
    }

    pub fn with_runtime_id(mut self, runtime_id: &str) -> Self {
        self.runtime_id = runtime_id.to_owned();
        self
    }

    pub fn with_status(mut self, status: ContainerStatus) -> Self {
        self.status = status;
        self
    }

    pub fn is_provisioned(&self) -> bool {
        !self.runtime_id.is_empty()
    }
}

impl fmt::Display for InventoryRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Container{{id: {}, name: {}, status: {}}}", self.id, self.name, self.status)
    }
}
