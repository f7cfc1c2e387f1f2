// Thin repository over the Docker daemon socket via bollard.
// Every method is one daemon call; errors propagate to the caller, which
// decides whether to degrade (stats engine) or surface them (routes).

use anyhow::Context;
use bollard::Docker;
use bollard::query_parameters::{
    CreateContainerOptionsBuilder, CreateImageOptionsBuilder, ListContainersOptions,
    ListImagesOptions, LogsOptionsBuilder, RemoveContainerOptionsBuilder,
    RemoveImageOptionsBuilder, StatsOptions,
};
use bollard::models::{
    ContainerCreateBody, ContainerInspectResponse, ContainerStatsResponse, ContainerSummary,
    ImageSummary, Network, NetworkingConfig, Volume,
};
use futures_util::{StreamExt, TryStreamExt};
use std::collections::HashMap;

pub struct DockerRepo {
    docker: Docker,
}

impl DockerRepo {
    pub fn connect() -> anyhow::Result<Self> {
        let docker = Docker::connect_with_unix_defaults()?;
        Ok(Self { docker })
    }

    pub async fn ping(&self) -> anyhow::Result<String> {
        Ok(self.docker.ping().await?)
    }

    pub async fn list_containers(&self, all: bool) -> anyhow::Result<Vec<ContainerSummary>> {
        let options = ListContainersOptions {
            all,
            ..Default::default()
        };
        Ok(self.docker.list_containers(Some(options)).await?)
    }

    pub async fn list_running_containers(&self) -> anyhow::Result<Vec<ContainerSummary>> {
        let mut filters = HashMap::new();
        filters.insert("status".to_string(), vec!["running".to_string()]);
        let options = ListContainersOptions {
            all: false,
            filters: Some(filters),
            ..Default::default()
        };
        Ok(self.docker.list_containers(Some(options)).await?)
    }

    pub async fn inspect_container(&self, name: &str) -> anyhow::Result<ContainerInspectResponse> {
        Ok(self.docker.inspect_container(name, None).await?)
    }

    /// One non-streaming stats sample. The daemon internally takes two probes
    /// so the pre-sample counters in the response are populated.
    pub async fn stats_snapshot(&self, name: &str) -> anyhow::Result<ContainerStatsResponse> {
        let options = StatsOptions {
            stream: false,
            ..Default::default()
        };
        let mut stream = self.docker.stats(name, Some(options));
        match stream.next().await {
            Some(result) => Ok(result?),
            None => anyhow::bail!("no stats sample returned for container {}", name),
        }
    }

    pub async fn container_logs(&self, name: &str, tail: u32) -> anyhow::Result<String> {
        let options = LogsOptionsBuilder::default()
            .stdout(true)
            .stderr(true)
            .timestamps(true)
            .tail(&tail.to_string())
            .build();
        let mut stream = self.docker.logs(name, Some(options));
        let mut out = String::new();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            out.push_str(&String::from_utf8_lossy(&chunk.into_bytes()));
        }
        Ok(out)
    }

    pub async fn start_container(&self, name: &str) -> anyhow::Result<()> {
        Ok(self.docker.start_container(name, None).await?)
    }

    pub async fn stop_container(&self, name: &str) -> anyhow::Result<()> {
        Ok(self.docker.stop_container(name, None).await?)
    }

    pub async fn restart_container(&self, name: &str) -> anyhow::Result<()> {
        Ok(self.docker.restart_container(name, None).await?)
    }

    pub async fn kill_container(&self, name: &str) -> anyhow::Result<()> {
        Ok(self.docker.kill_container(name, None).await?)
    }

    pub async fn remove_container(&self, name: &str, force: bool) -> anyhow::Result<()> {
        let options = RemoveContainerOptionsBuilder::default().force(force).build();
        Ok(self.docker.remove_container(name, Some(options)).await?)
    }

    /// Pull the image a container was created from, by container name.
    pub async fn pull_container_image(&self, name: &str) -> anyhow::Result<String> {
        let inspect = self.inspect_container(name).await?;
        let image = inspect
            .config
            .as_ref()
            .and_then(|c| c.image.clone())
            .context("container has no image reference")?;
        self.pull_image(&image).await?;
        Ok(image)
    }

    pub async fn pull_image(&self, image: &str) -> anyhow::Result<()> {
        let options = CreateImageOptionsBuilder::default().from_image(image).build();
        self.docker
            .create_image(Some(options), None, None)
            .try_collect::<Vec<_>>()
            .await?;
        Ok(())
    }

    pub async fn create_container(
        &self,
        name: Option<&str>,
        body: ContainerCreateBody,
    ) -> anyhow::Result<String> {
        let mut builder = CreateContainerOptionsBuilder::default();
        if let Some(name) = name {
            builder = builder.name(name);
        }
        let created = self
            .docker
            .create_container(Some(builder.build()), body)
            .await?;
        Ok(created.id)
    }

    /// Stop, remove and recreate a container from its live configuration,
    /// then start the replacement and return its inspect record.
    pub async fn recreate_container(&self, name: &str) -> anyhow::Result<ContainerInspectResponse> {
        let inspect = self.inspect_container(name).await?;
        let stripped = inspect
            .name
            .as_deref()
            .unwrap_or(name)
            .trim_start_matches('/')
            .to_string();
        let body = create_body_from_inspect(&inspect);

        // The old container may already be stopped or gone.
        if let Err(e) = self.stop_container(name).await {
            tracing::debug!(error = %e, container = name, "stop before recreate failed");
        }
        if let Err(e) = self.remove_container(name, false).await {
            tracing::debug!(error = %e, container = name, "remove before recreate failed");
        }

        let id = self.create_container(Some(&stripped), body).await?;
        self.start_container(&id).await?;
        self.inspect_container(&id).await
    }

    pub async fn list_images(&self) -> anyhow::Result<Vec<ImageSummary>> {
        let options = ListImagesOptions {
            all: false,
            ..Default::default()
        };
        Ok(self.docker.list_images(Some(options)).await?)
    }

    pub async fn remove_image(&self, image: &str, force: bool) -> anyhow::Result<()> {
        let options = RemoveImageOptionsBuilder::default().force(force).build();
        self.docker.remove_image(image, Some(options), None).await?;
        Ok(())
    }

    pub async fn list_networks(&self) -> anyhow::Result<Vec<Network>> {
        Ok(self.docker.list_networks(None).await?)
    }

    pub async fn remove_network(&self, name: &str) -> anyhow::Result<()> {
        Ok(self.docker.remove_network(name).await?)
    }

    pub async fn list_volumes(&self) -> anyhow::Result<Vec<Volume>> {
        let response = self
            .docker
            .list_volumes(None::<bollard::query_parameters::ListVolumesOptions>)
            .await?;
        Ok(response.volumes.unwrap_or_default())
    }

    pub async fn remove_volume(&self, name: &str) -> anyhow::Result<()> {
        Ok(self
            .docker
            .remove_volume(name, None::<bollard::query_parameters::RemoveVolumeOptions>)
            .await?)
    }
}

/// Carry a container's inspected configuration into a create request.
fn create_body_from_inspect(inspect: &ContainerInspectResponse) -> ContainerCreateBody {
    let config = inspect.config.as_ref();
    let sorted_keys = |list: Option<&Vec<String>>| {
        list.map(|l| {
            let mut keys = l.clone();
            keys.sort();
            keys
        })
    };
    ContainerCreateBody {
        image: config.and_then(|c| c.image.clone()),
        env: config.and_then(|c| c.env.clone()),
        cmd: config.and_then(|c| c.cmd.clone()),
        entrypoint: config.and_then(|c| c.entrypoint.clone()),
        working_dir: config.and_then(|c| c.working_dir.clone()),
        labels: config.and_then(|c| c.labels.clone()),
        exposed_ports: sorted_keys(config.and_then(|c| c.exposed_ports.as_ref())),
        volumes: sorted_keys(config.and_then(|c| c.volumes.as_ref())),
        host_config: inspect.host_config.clone(),
        networking_config: inspect
            .network_settings
            .as_ref()
            .and_then(|n| n.networks.clone())
            .map(|networks| NetworkingConfig {
                endpoints_config: Some(networks),
            }),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_body_carries_config_and_host_config() {
        let inspect: ContainerInspectResponse = serde_json::from_value(serde_json::json!({
            "Name": "/app",
            "Config": {
                "Image": "nginx:latest",
                "Env": ["A=1"],
                "ExposedPorts": { "80/tcp": {}, "443/tcp": {} },
                "Labels": { "app": "web" }
            },
            "HostConfig": { "NetworkMode": "bridge", "Binds": ["/data:/data"] },
            "NetworkSettings": { "Networks": { "bridge": {} } }
        }))
        .expect("inspect fixture");
        let body = create_body_from_inspect(&inspect);
        assert_eq!(body.image.as_deref(), Some("nginx:latest"));
        assert_eq!(body.env.as_deref(), Some(&["A=1".to_string()][..]));
        assert_eq!(
            body.exposed_ports,
            Some(vec!["443/tcp".to_string(), "80/tcp".to_string()])
        );
        assert_eq!(
            body.host_config.as_ref().and_then(|h| h.network_mode.as_deref()),
            Some("bridge")
        );
        assert!(body.networking_config.is_some());
    }

    #[test]
    fn create_body_tolerates_empty_inspect() {
        let body = create_body_from_inspect(&ContainerInspectResponse::default());
        assert!(body.image.is_none());
        assert!(body.exposed_ports.is_none());
        assert!(body.networking_config.is_none());
    }
}
