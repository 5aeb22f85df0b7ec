//! Common types shared across DockFormer crates
//!
//! The declarative container specification, the structured port model,
//! the container status enum and the persisted inventory record live
//! here so the runtime backends, the inventory store and the engine can
//! agree on them without depending on each other.

pub mod container;
pub mod error;
pub mod inventory;
pub mod network;
pub mod validation;

pub use container::*;
pub use error::*;
pub use inventory::*;
pub use network::*;
pub use validation::*;
