//! Port mapping field parsing
//!
//! A field is a comma separated list of `hostPort:containerPort[/protocol]`
//! entries. The host part may be empty to let the runtime pick one.

use dockformer_types::{PortBindings, PortKey, Protocol};

use crate::error::PortSpecError;

/// Resolve a port mapping field into a bind table.
///
/// An empty field yields an empty table. Blank entries are skipped. A
/// container port listed twice keeps the last host binding.
pub fn resolve_ports(field: &str) -> Result<PortBindings, PortSpecError> {
    let mut bindings = PortBindings::new();

    for entry in field.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (key, host_port) = parse_entry(entry)?;
        bindings.bind(key, host_port);
    }

    Ok(bindings)
}

fn parse_entry(entry: &str) -> Result<(PortKey, Option<u16>), PortSpecError> {
    let parts: Vec<&str> = entry.split(':').collect();
    let [host, container] = parts.as_slice() else {
        return Err(PortSpecError::MissingSeparator {
            entry: entry.to_owned(),
        });
    };

    let host = host.trim();
    let host_port = if host.is_empty() {
        None
    } else {
        Some(
            host.parse::<u16>()
                .map_err(|_| PortSpecError::InvalidHostPort {
                    entry: entry.to_owned(),
                })?,
        )
    };

    let (port, protocol) = match container.split_once('/') {
        Some((port, protocol)) => {
            let protocol = protocol.parse::<Protocol>().map_err(|_| {
                PortSpecError::UnknownProtocol {
                    entry: entry.to_owned(),
                    protocol: protocol.to_owned(),
                }
            })?;
            (port, protocol)
        }
        None => (*container, Protocol::Tcp),
    };

    let port = port
        .trim()
        .parse::<u16>()
        .ok()
        .filter(|port| *port != 0)
        .ok_or_else(|| PortSpecError::InvalidContainerPort {
            entry: entry.to_owned(),
        })?;

    Ok((PortKey::new(port, protocol), host_port))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_mapping_defaults_to_tcp() {
        let bindings = resolve_ports("8080:80").unwrap();
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings.host_port(&PortKey::tcp(80)), Some(8080));
        assert!(bindings.exposed_ports().contains(&PortKey::tcp(80)));
    }

    #[test]
    fn test_mixed_protocols() {
        let bindings = resolve_ports("8080:80/udp,9000:90").unwrap();
        assert_eq!(bindings.len(), 2);
        assert_eq!(bindings.host_port(&PortKey::udp(80)), Some(8080));
        assert_eq!(bindings.host_port(&PortKey::tcp(90)), Some(9000));
        assert!(!bindings.contains(&PortKey::tcp(80)));
    }

    #[test]
    fn test_missing_colon() {
        let err = resolve_ports("bad").unwrap_err();
        assert_eq!(
            err,
            PortSpecError::MissingSeparator {
                entry: "bad".into()
            }
        );
    }

    #[test]
    fn test_too_many_colons() {
        assert!(matches!(
            resolve_ports("127.0.0.1:8080:80"),
            Err(PortSpecError::MissingSeparator { .. })
        ));
    }

    #[test]
    fn test_empty_field() {
        assert!(resolve_ports("").unwrap().is_empty());
        assert!(resolve_ports("  ").unwrap().is_empty());
    }

    #[test]
    fn test_whitespace_and_stray_commas() {
        let bindings = resolve_ports(" 8080:80 ,, 8443:443/TCP ,").unwrap();
        assert_eq!(bindings.len(), 2);
        assert_eq!(bindings.host_port(&PortKey::tcp(443)), Some(8443));
    }

    #[test]
    fn test_last_binding_wins() {
        let bindings = resolve_ports("8080:80,9090:80").unwrap();
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings.host_port(&PortKey::tcp(80)), Some(9090));
    }

    #[test]
    fn test_empty_host_is_ephemeral() {
        let bindings = resolve_ports(":80").unwrap();
        assert!(bindings.contains(&PortKey::tcp(80)));
        assert_eq!(bindings.host_port(&PortKey::tcp(80)), None);
    }

    #[test]
    fn test_bad_ports() {
        assert!(matches!(
            resolve_ports("http:80"),
            Err(PortSpecError::InvalidHostPort { .. })
        ));
        assert!(matches!(
            resolve_ports("8080:99999"),
            Err(PortSpecError::InvalidContainerPort { .. })
        ));
        assert!(matches!(
            resolve_ports("8080:0"),
            Err(PortSpecError::InvalidContainerPort { .. })
        ));
        assert!(matches!(
            resolve_ports("8080:80/icmp"),
            Err(PortSpecError::UnknownProtocol { protocol, .. }) if protocol == "icmp"
        ));
    }
}
