// Enriched container views and fleet-level rollups

use serde::{Deserialize, Serialize};

/// One published port from the container list record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    pub private_port: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_port: Option<u16>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
}

/// Pre-formatted usage strings; the display contract of the enriched view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerUsage {
    pub cpu_perc: String,
    pub mem_perc: String,
    pub mem_size: String,
    pub block_io: String,
    pub net_io: String,
}

impl ContainerUsage {
    /// All-zero usage, used for stopped containers and failed per-container fetches.
    pub fn zero() -> Self {
        Self {
            cpu_perc: "0.00%".to_string(),
            mem_perc: "0.00%".to_string(),
            mem_size: "0B / 0B".to_string(),
            block_io: "0B / 0B".to_string(),
            net_io: "0B / 0B".to_string(),
        }
    }
}

/// One container's identity and state combined with derived, pre-formatted metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerView {
    pub id: String,
    pub name: String,
    pub image: String,
    /// Formatted image size, or the literal "unknown" when no image matches.
    pub image_size: String,
    pub status: String,
    pub health: String,
    pub created_at: String,
    pub uptime: String,
    pub network_mode: String,
    pub ports: Vec<PortView>,
    pub usage: ContainerUsage,
    pub server: String,
}

/// Container counts by state plus inventory counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FleetSummary {
    pub total: usize,
    pub running: usize,
    pub paused: usize,
    pub stopped: usize,
    pub images: usize,
    pub networks: usize,
    pub volumes: usize,
}

/// Fleet-wide usage rollup across running containers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetMetrics {
    pub cpu: String,
    pub memory: String,
    pub memory_percent: String,
    pub containers: usize,
}
