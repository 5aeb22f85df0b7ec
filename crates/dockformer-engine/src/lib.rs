//! DockFormer engine
//!
//! Turns container specifications into runtime containers and keeps the
//! inventory in line with what the runtime reports. The runtime client
//! and the inventory store are handed in by whoever assembles the
//! [`Engine`]; nothing here holds a process-wide handle.

pub mod engine;
pub mod error;
pub mod locks;
pub mod ports;
pub mod provision;
pub mod reconcile;

pub use engine::{Engine, EngineConfig, RecordUpdate};
pub use error::{EngineError, PortSpecError, Result};
pub use locks::NameLocks;
pub use ports::resolve_ports;
pub use provision::Provisioner;
pub use reconcile::{logical_name, ReconcileConfig, ReconcileReport};
