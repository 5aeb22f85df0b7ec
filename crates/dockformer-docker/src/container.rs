use async_trait::async_trait;
use bollard::container::{
    Config, CreateContainerOptions, InspectContainerOptions, ListContainersOptions, LogsOptions,
    NetworkingConfig, RemoveContainerOptions, RestartContainerOptions, StartContainerOptions,
    StopContainerOptions,
};
use bollard::image::CreateImageOptions;
use bollard::models::{
    ContainerInspectResponse, ContainerSummary, EndpointSettings, HostConfig, PortBinding,
    PortTypeEnum,
};
use bollard::network::ConnectNetworkOptions;
use bollard::Docker;
use dockformer_runtime::{
    ContainerDetails, ContainerObservation, CreateContainerRequest, ImageInfo, LogStream,
    PullProgress, PullStream, RemoveOptions, RuntimeClient, RuntimeConfig, RuntimeError,
};
use dockformer_types::{ContainerStatus, ObservedPort, Protocol};
use futures_util::stream::StreamExt;
use std::collections::HashMap;
use tracing::{debug, info, warn};

use crate::error::{is_not_found, runtime_error, DockerError, Result};
use crate::logs::parse_log_output;

/// Docker Engine implementation of [`RuntimeClient`].
///
/// Holds one bollard handle; cloning is cheap and shares the underlying
/// connection.
#[derive(Debug, Clone)]
pub struct DockerRuntime {
    docker: Docker,
    config: RuntimeConfig,
}

impl DockerRuntime {
    /// Connect using `config.socket_path`, or the local defaults
    /// (`DOCKER_HOST`, then the standard socket) when unset.
    pub fn connect(config: RuntimeConfig) -> Result<Self> {
        let docker = match &config.socket_path {
            Some(path) => Docker::connect_with_unix(
                path,
                config.timeout_seconds,
                bollard::API_DEFAULT_VERSION,
            ),
            None => Docker::connect_with_local_defaults()
                .map(|docker| docker.with_timeout(config.effective_timeout())),
        }
        .map_err(|e| DockerError::ConnectionError(format!("Failed to connect to Docker: {}", e)))?;

        Ok(Self { docker, config })
    }

    pub fn from_docker(docker: Docker, config: RuntimeConfig) -> Self {
        Self { docker, config }
    }

    pub fn docker(&self) -> &Docker {
        &self.docker
    }

    /// Check that the daemon answers
    pub async fn ping(&self) -> Result<()> {
        self.docker.ping().await?;
        Ok(())
    }

    async fn connect_networks(&self, name: &str, networks: &[String]) -> std::result::Result<(), RuntimeError> {
        for network in networks {
            let options = ConnectNetworkOptions {
                container: name.to_owned(),
                endpoint_config: EndpointSettings::default(),
            };
            self.docker
                .connect_network(network, options)
                .await
                .map_err(|e| runtime_error("connect_network", network, e))?;
            debug!(container = %name, network = %network, "Attached network");
        }
        Ok(())
    }

    /// Force-remove a container whose create did not complete
    async fn discard_created(&self, name: &str) {
        let options = RemoveContainerOptions {
            force: true,
            ..Default::default()
        };
        match self.docker.remove_container(name, Some(options)).await {
            Ok(()) => debug!(container = %name, "Removed partially created container"),
            Err(e) if is_not_found(&e) => {}
            Err(e) => warn!(container = %name, error = %e, "Failed to remove partially created container"),
        }
    }
}

/// Translate a create request into the daemon's container config.
///
/// The first network becomes the network mode; further networks are
/// attached after creation.
pub fn build_container_config(request: &CreateContainerRequest) -> Config<String> {
    let exposed_ports: HashMap<String, HashMap<(), ()>> = request
        .ports
        .exposed_ports()
        .into_iter()
        .map(|key| (key.to_string(), HashMap::new()))
        .collect();

    let port_bindings: HashMap<String, Option<Vec<PortBinding>>> = request
        .ports
        .iter()
        .map(|(key, host_port)| {
            (
                key.to_string(),
                Some(vec![PortBinding {
                    host_ip: None,
                    host_port: Some(host_port.map(|p| p.to_string()).unwrap_or_default()),
                }]),
            )
        })
        .collect();

    let host_config = HostConfig {
        port_bindings: Some(port_bindings),
        binds: if request.binds.is_empty() {
            None
        } else {
            Some(request.binds.clone())
        },
        network_mode: request.networks.first().cloned(),
        ..Default::default()
    };

    let networking_config = request.networks.first().map(|network| NetworkingConfig {
        endpoints_config: HashMap::from([(network.clone(), EndpointSettings::default())]),
    });

    Config {
        image: Some(request.image.clone()),
        env: Some(request.env.clone()),
        exposed_ports: Some(exposed_ports),
        cmd: request.command.clone(),
        host_config: Some(host_config),
        networking_config,
        ..Default::default()
    }
}

fn protocol_from_port_type(typ: Option<PortTypeEnum>) -> Option<Protocol> {
    match typ? {
        PortTypeEnum::TCP => Some(Protocol::Tcp),
        PortTypeEnum::UDP => Some(Protocol::Udp),
        PortTypeEnum::SCTP => Some(Protocol::Sctp),
        PortTypeEnum::EMPTY => None,
    }
}

pub fn observation_from_summary(summary: ContainerSummary) -> ContainerObservation {
    let name = summary
        .names
        .as_ref()
        .and_then(|names| names.first().cloned())
        .unwrap_or_default();

    let ports = summary
        .ports
        .unwrap_or_default()
        .into_iter()
        .map(|port| ObservedPort {
            private_port: port.private_port,
            public_port: port.public_port,
            protocol: protocol_from_port_type(port.typ),
        })
        .collect();

    ContainerObservation {
        id: summary.id.unwrap_or_default(),
        name,
        image: summary.image.unwrap_or_default(),
        state: ContainerStatus::from(summary.state.as_deref().unwrap_or_default()),
        ports,
    }
}

pub fn details_from_inspect(name: &str, info: ContainerInspectResponse) -> ContainerDetails {
    let status = info
        .state
        .as_ref()
        .and_then(|state| state.status.as_ref())
        .map(|status| ContainerStatus::from(status.to_string().as_str()))
        .unwrap_or_else(|| ContainerStatus::Unrecognized("unknown".to_owned()));

    let image = info
        .config
        .as_ref()
        .and_then(|config| config.image.clone())
        .or(info.image)
        .unwrap_or_default();

    ContainerDetails {
        id: info.id.unwrap_or_default(),
        name: info
            .name
            .map(|n| n.trim_start_matches('/').to_owned())
            .unwrap_or_else(|| name.to_owned()),
        image,
        status,
    }
}

#[async_trait]
impl RuntimeClient for DockerRuntime {
    async fn inspect_image(&self, reference: &str) -> std::result::Result<Option<ImageInfo>, RuntimeError> {
        match self.docker.inspect_image(reference).await {
            Ok(image) => Ok(Some(ImageInfo {
                id: image.id.unwrap_or_default(),
                tags: image.repo_tags.unwrap_or_default(),
            })),
            Err(e) if is_not_found(&e) => Ok(None),
            Err(e) => Err(runtime_error("inspect_image", reference, e)),
        }
    }

    async fn pull_image(&self, reference: &str) -> std::result::Result<PullStream, RuntimeError> {
        info!(image = %reference, "Pulling image");

        let options = CreateImageOptions {
            from_image: reference.to_owned(),
            ..Default::default()
        };
        let reference = reference.to_owned();

        let stream = self
            .docker
            .create_image(Some(options), None, None)
            .map(move |item| match item {
                Ok(info) => match info.error {
                    Some(error) => Err(RuntimeError::StreamError(format!(
                        "pull {}: {}",
                        reference, error
                    ))),
                    None => Ok(PullProgress {
                        id: info.id,
                        status: info.status,
                        progress: info.progress,
                    }),
                },
                Err(e) => Err(runtime_error("pull_image", &reference, e)),
            });

        Ok(Box::pin(stream))
    }

    async fn inspect_container(&self, name: &str) -> std::result::Result<Option<ContainerDetails>, RuntimeError> {
        match self
            .docker
            .inspect_container(name, None::<InspectContainerOptions>)
            .await
        {
            Ok(info) => Ok(Some(details_from_inspect(name, info))),
            Err(e) if is_not_found(&e) => Ok(None),
            Err(e) => Err(runtime_error("inspect_container", name, e)),
        }
    }

    async fn create_container(&self, request: CreateContainerRequest) -> std::result::Result<String, RuntimeError> {
        let options = CreateContainerOptions {
            name: request.name.clone(),
            ..Default::default()
        };
        let config = build_container_config(&request);

        let response = self
            .docker
            .create_container(Some(options), config)
            .await
            .map_err(|e| runtime_error("create_container", &request.name, e))?;

        for warning in &response.warnings {
            debug!(container = %request.name, "Create warning: {}", warning);
        }

        if request.networks.len() > 1 {
            if let Err(e) = self.connect_networks(&request.name, &request.networks[1..]).await {
                self.discard_created(&request.name).await;
                return Err(e);
            }
        }

        Ok(response.id)
    }

    async fn start_container(&self, name: &str) -> std::result::Result<(), RuntimeError> {
        self.docker
            .start_container(name, None::<StartContainerOptions<String>>)
            .await
            .map_err(|e| runtime_error("start_container", name, e))
    }

    async fn stop_container(&self, name: &str) -> std::result::Result<(), RuntimeError> {
        let options = StopContainerOptions {
            t: self.config.stop_timeout_seconds,
        };
        self.docker
            .stop_container(name, Some(options))
            .await
            .map_err(|e| runtime_error("stop_container", name, e))
    }

    async fn restart_container(&self, name: &str) -> std::result::Result<(), RuntimeError> {
        let options = RestartContainerOptions {
            t: self.config.stop_timeout_seconds as isize,
        };
        self.docker
            .restart_container(name, Some(options))
            .await
            .map_err(|e| runtime_error("restart_container", name, e))
    }

    async fn remove_container(&self, name: &str, options: RemoveOptions) -> std::result::Result<(), RuntimeError> {
        let options = RemoveContainerOptions {
            force: options.force,
            v: options.remove_volumes,
            ..Default::default()
        };
        self.docker
            .remove_container(name, Some(options))
            .await
            .map_err(|e| runtime_error("remove_container", name, e))
    }

    async fn list_containers(&self, all: bool) -> std::result::Result<Vec<ContainerObservation>, RuntimeError> {
        let options = ListContainersOptions::<String> {
            all,
            ..Default::default()
        };

        let summaries = self
            .docker
            .list_containers(Some(options))
            .await
            .map_err(|e| runtime_error("list_containers", "all", e))?;

        Ok(summaries.into_iter().map(observation_from_summary).collect())
    }

    async fn stream_logs(&self, name: &str, tail: Option<usize>) -> std::result::Result<LogStream, RuntimeError> {
        let options = LogsOptions::<String> {
            stdout: true,
            stderr: true,
            follow: false,
            tail: tail
                .map(|n| n.to_string())
                .unwrap_or_else(|| "all".to_string()),
            ..Default::default()
        };

        let container = name.to_owned();
        let stream = self
            .docker
            .logs(name, Some(options))
            .map(move |item| match item {
                Ok(output) => Ok(parse_log_output(output)),
                Err(e) => Err(runtime_error("stream_logs", &container, e)),
            });

        Ok(Box::pin(stream))
    }
}
