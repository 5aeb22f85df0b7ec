//! Port binding types shared across crates

use crate::error::{Result, TypesError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// Transport protocol of a container port
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Tcp,
    Udp,
    Sctp,
}

impl Default for Protocol {
    fn default() -> Self {
        Protocol::Tcp
    }
}

impl FromStr for Protocol {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "tcp" => Ok(Protocol::Tcp),
            "udp" => Ok(Protocol::Udp),
            "sctp" => Ok(Protocol::Sctp),
            other => Err(TypesError::UnknownProtocol(other.to_owned())),
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Tcp => write!(f, "tcp"),
            Protocol::Udp => write!(f, "udp"),
            Protocol::Sctp => write!(f, "sctp"),
        }
    }
}

/// A container-side port together with its protocol, e.g. `80/tcp`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PortKey {
    pub port: u16,
    pub protocol: Protocol,
}

impl PortKey {
    pub fn new(port: u16, protocol: Protocol) -> Self {
        Self { port, protocol }
    }

    pub fn tcp(port: u16) -> Self {
        Self::new(port, Protocol::Tcp)
    }

    pub fn udp(port: u16) -> Self {
        Self::new(port, Protocol::Udp)
    }
}

/// Formats as the runtime's bind table key (`80/tcp`)
impl fmt::Display for PortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.port, self.protocol)
    }
}

/// Resolved port bindings: container port -> host port.
///
/// A `None` host port asks the runtime to pick an ephemeral one. Every
/// bound container port is also exposed, so the exposed set is the key
/// set of the bind table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortBindings {
    bindings: BTreeMap<PortKey, Option<u16>>,
}

impl PortBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `key` to `host_port`, returning the previous binding if the
    /// container port was already bound.
    pub fn bind(&mut self, key: PortKey, host_port: Option<u16>) -> Option<Option<u16>> {
        self.bindings.insert(key, host_port)
    }

    pub fn host_port(&self, key: &PortKey) -> Option<u16> {
        self.bindings.get(key).copied().flatten()
    }

    pub fn contains(&self, key: &PortKey) -> bool {
        self.bindings.contains_key(key)
    }

    pub fn exposed_ports(&self) -> BTreeSet<PortKey> {
        self.bindings.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&PortKey, &Option<u16>)> {
        self.bindings.iter()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// An observed published port as reported by a runtime listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservedPort {
    pub private_port: u16,
    pub public_port: Option<u16>,
    pub protocol: Option<Protocol>,
}

/// Summarize observed ports as `public:private` entries joined by `,`.
///
/// Ports without a public binding are left out.
pub fn summarize_ports(ports: &[ObservedPort]) -> String {
    ports
        .iter()
        .filter_map(|p| match p.public_port {
            Some(public) if public != 0 => Some(format!("{}:{}", public, p.private_port)),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join(",")
}
