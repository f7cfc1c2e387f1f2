// Stats aggregation and derived views over the Docker daemon.
// Stateless per request: every call re-derives its view from live queries.

pub mod format;
pub mod metrics;
pub mod translate;
pub mod view;

use crate::docker_repo::DockerRepo;
use crate::models::{ContainerView, FleetMetrics, FleetSummary};
use bollard::models::ContainerSummary;
use futures_util::future::join_all;
use std::sync::Arc;
use tracing::warn;

use self::view::{Enrichment, ImageSizeIndex, build_container_view};

/// Fleet-level aggregation engine. Holds no state beyond its collaborators;
/// the client handle is injected so its lifecycle stays with process startup.
pub struct StatsEngine {
    docker: Arc<DockerRepo>,
    server_name: String,
}

impl StatsEngine {
    pub fn new(docker: Arc<DockerRepo>, server_name: impl Into<String>) -> Self {
        Self {
            docker,
            server_name: server_name.into(),
        }
    }

    /// Enriched view of every container, running or not. Running containers
    /// get live stats and inspect data, fetched concurrently per container;
    /// a failed fetch degrades that one container to zeroed usage. Result
    /// order follows the daemon's listing order.
    pub async fn list_enriched_containers(&self) -> anyhow::Result<Vec<ContainerView>> {
        let containers = self.docker.list_containers(true).await?;
        let images = self.docker.list_images().await?;
        let index = ImageSizeIndex::new(&images);
        let views = join_all(
            containers
                .iter()
                .map(|record| self.enrich(record, &index)),
        )
        .await;
        Ok(views)
    }

    async fn enrich(&self, record: &ContainerSummary, index: &ImageSizeIndex) -> ContainerView {
        let enrichment = self.fetch_enrichment(record).await;
        build_container_view(record, index, &self.server_name, &enrichment)
    }

    async fn fetch_enrichment(&self, record: &ContainerSummary) -> Enrichment {
        if !is_running(record) {
            return None;
        }
        let id = record.id.as_deref().unwrap_or_default();
        let (stats, inspect) = tokio::join!(
            self.docker.stats_snapshot(id),
            self.docker.inspect_container(id)
        );
        match (stats, inspect) {
            (Ok(stats), Ok(inspect)) => Some((stats, inspect)),
            (Err(e), _) | (_, Err(e)) => {
                warn!(
                    error = %e,
                    container = id,
                    operation = "enrich_container",
                    "live data fetch failed; using zeroed usage"
                );
                None
            }
        }
    }

    /// Fleet-wide totals across running containers. A failed per-container
    /// stats fetch contributes zero but the container still counts.
    pub async fn fleet_metrics(&self) -> anyhow::Result<FleetMetrics> {
        let containers = self.docker.list_containers(true).await?;
        let snapshots = join_all(containers.iter().map(|record| async move {
            if !is_running(record) {
                return None;
            }
            let id = record.id.as_deref().unwrap_or_default();
            match self.docker.stats_snapshot(id).await {
                Ok(stats) => Some(stats),
                Err(e) => {
                    warn!(
                        error = %e,
                        container = id,
                        operation = "fleet_metrics",
                        "stats fetch failed; counting container with zero usage"
                    );
                    None
                }
            }
        }))
        .await;

        let mut cpu_total = 0.0;
        let mut mem_used = 0u64;
        let mut mem_limit = 0u64;
        for stats in snapshots.iter().flatten() {
            cpu_total += metrics::cpu_percent(stats);
            let (used, limit) = metrics::memory_usage(stats);
            mem_used += used;
            mem_limit += limit;
        }
        Ok(FleetMetrics {
            cpu: format!("{:.2}%", cpu_total),
            memory: format!(
                "{} / {}",
                format::format_bytes_binary(mem_used),
                format::format_bytes_binary(mem_limit)
            ),
            memory_percent: format!("{:.2}%", metrics::memory_percent(mem_used, mem_limit)),
            containers: containers.len(),
        })
    }

    /// Container counts by state plus image/network/volume inventory counts.
    /// A failed volume listing degrades to zero instead of failing the call.
    pub async fn overview(&self) -> anyhow::Result<FleetSummary> {
        let containers = self.docker.list_containers(true).await?;
        let images = self.docker.list_images().await?;
        let networks = self.docker.list_networks().await?;
        let volumes = match self.docker.list_volumes().await {
            Ok(v) => v.len(),
            Err(e) => {
                warn!(error = %e, operation = "overview", "volume listing failed; reporting 0");
                0
            }
        };
        Ok(FleetSummary {
            total: containers.len(),
            running: count_state(&containers, "running"),
            paused: count_state(&containers, "paused"),
            stopped: count_state(&containers, "exited"),
            images: images.len(),
            networks: networks.len(),
            volumes,
        })
    }
}

fn state_of(record: &ContainerSummary) -> String {
    record
        .state
        .as_ref()
        .map(|s| s.to_string())
        .unwrap_or_default()
}

fn is_running(record: &ContainerSummary) -> bool {
    state_of(record) == "running"
}

fn count_state(containers: &[ContainerSummary], state: &str) -> usize {
    containers.iter().filter(|c| state_of(c) == state).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(state: &str) -> ContainerSummary {
        serde_json::from_value(serde_json::json!({ "Id": "x", "State": state }))
            .expect("summary fixture")
    }

    #[test]
    fn count_state_buckets_only_known_states() {
        let fleet = vec![
            summary("running"),
            summary("running"),
            summary("exited"),
            summary("paused"),
            summary("created"),
        ];
        assert_eq!(count_state(&fleet, "running"), 2);
        assert_eq!(count_state(&fleet, "paused"), 1);
        assert_eq!(count_state(&fleet, "exited"), 1);
        // "created" lands in no bucket but still counts toward the total.
        assert_eq!(fleet.len(), 5);
    }
}
