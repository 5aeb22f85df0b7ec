//! Container specification and status types shared across crates

use crate::error::{Result, TypesError};
use crate::validation::ContainerNameValidator;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::Path;

/// Observed state of a runtime container.
///
/// States outside the known set are kept verbatim in `Unrecognized` so
/// newer runtimes never break comparisons or persistence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ContainerStatus {
    Created,
    Running,
    Stopped,
    Restarting,
    Paused,
    Exited,
    Unrecognized(String),
}

impl ContainerStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ContainerStatus::Created => "created",
            ContainerStatus::Running => "running",
            ContainerStatus::Stopped => "stopped",
            ContainerStatus::Restarting => "restarting",
            ContainerStatus::Paused => "paused",
            ContainerStatus::Exited => "exited",
            ContainerStatus::Unrecognized(raw) => raw,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, ContainerStatus::Running)
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, ContainerStatus::Unrecognized(_))
    }
}

impl From<&str> for ContainerStatus {
    fn from(status: &str) -> Self {
        match status.trim().to_lowercase().as_str() {
            "created" => ContainerStatus::Created,
            "running" => ContainerStatus::Running,
            "stopped" => ContainerStatus::Stopped,
            "restarting" => ContainerStatus::Restarting,
            "paused" => ContainerStatus::Paused,
            "exited" => ContainerStatus::Exited,
            _ => ContainerStatus::Unrecognized(status.to_owned()),
        }
    }
}

impl From<String> for ContainerStatus {
    fn from(status: String) -> Self {
        ContainerStatus::from(status.as_str())
    }
}

impl From<ContainerStatus> for String {
    fn from(status: ContainerStatus) -> Self {
        status.as_str().to_owned()
    }
}

impl fmt::Display for ContainerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declarative description of one container, as read from a
/// configuration document or built by an API caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerSpec {
    pub name: String,
    pub image: String,
    /// `host:container[/protocol]` entries separated by commas. A YAML
    /// list of entries is accepted too and joined on load.
    #[serde(default, deserialize_with = "deserialize_ports")]
    pub ports: String,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    /// Bind mounts, `host-path:container-path[:mode]`
    #[serde(default)]
    pub volumes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default)]
    pub networks: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PortsField {
    Text(String),
    List(Vec<String>),
}

fn deserialize_ports<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<PortsField>::deserialize(deserializer)? {
        Some(PortsField::Text(text)) => text,
        Some(PortsField::List(entries)) => entries.join(","),
        None => String::new(),
    })
}

impl ContainerSpec {
    pub fn new(name: &str, image: &str) -> Self {
        Self {
            name: name.to_owned(),
            image: image.to_owned(),
            ports: String::new(),
            env: BTreeMap::new(),
            volumes: Vec::new(),
            command: None,
            networks: Vec::new(),
        }
    }

    pub fn with_ports(mut self, ports: &str) -> Self {
        self.ports = ports.to_owned();
        self
    }

    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.env.insert(key.to_owned(), value.to_owned());
        self
    }

    pub fn with_volume(mut self, bind: &str) -> Self {
        self.volumes.push(bind.to_owned());
        self
    }

    pub fn with_command(mut self, command: &str) -> Self {
        self.command = Some(command.to_owned());
        self
    }

    pub fn with_network(mut self, network: &str) -> Self {
        if !self.networks.iter().any(|n| n == network) {
            self.networks.push(network.to_owned());
        }
        self
    }

    /// Environment flattened to `KEY=VALUE` entries
    pub fn env_entries(&self) -> Vec<String> {
        self.env
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect()
    }

    /// Command override split on whitespace; `None` when unset or blank
    pub fn command_args(&self) -> Option<Vec<String>> {
        let args: Vec<String> = self
            .command
            .as_deref()?
            .split_whitespace()
            .map(str::to_owned)
            .collect();
        if args.is_empty() {
            None
        } else {
            Some(args)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(TypesError::MissingField { field: "name" });
        }
        if self.image.trim().is_empty() {
            return Err(TypesError::MissingField { field: "image" });
        }
        ContainerNameValidator::default().validate(&self.name)
    }
}

/// A configuration document: `containers:` followed by a list of specs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainersDocument {
    #[serde(default)]
    pub containers: Vec<ContainerSpec>,
}

impl ContainersDocument {
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let document: ContainersDocument = serde_yaml::from_str(content)?;
        document.validate()?;
        Ok(document)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for spec in &self.containers {
            spec.validate()?;
            if !seen.insert(spec.name.as_str()) {
                return Err(TypesError::DuplicateName(spec.name.clone()));
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.containers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }
}
