//! Inventory store for container records
//!
//! The engine only sees the [`InventoryStore`] trait. Records are keyed
//! by logical name, which makes the one-record-per-name rule a property
//! of every backend rather than something callers must check.

pub mod config;
pub mod error;
pub mod memory;
pub mod sled_store;
pub mod store;

pub use config::{InventoryBackend, InventoryConfig};
pub use error::{Result, StoreError};
pub use memory::MemoryInventory;
pub use sled_store::SledInventory;
pub use store::{open_inventory, InventoryStore};
