// Raw metric derivation from a single stats snapshot.
// All inputs are optional-field API shapes; absent counters read as zero and
// every function is total.

use bollard::models::ContainerStatsResponse;

/// CPU usage percentage across all online CPUs. Zero when the system-time
/// delta is not positive or the container counter went backwards.
pub fn cpu_percent(stats: &ContainerStatsResponse) -> f64 {
    let (Some(cpu), Some(precpu)) = (stats.cpu_stats.as_ref(), stats.precpu_stats.as_ref()) else {
        return 0.0;
    };
    let total = cpu.cpu_usage.as_ref().and_then(|u| u.total_usage).unwrap_or(0) as i64;
    let pre_total = precpu
        .cpu_usage
        .as_ref()
        .and_then(|u| u.total_usage)
        .unwrap_or(0) as i64;
    let cpu_delta = total - pre_total;
    let system_delta =
        cpu.system_cpu_usage.unwrap_or(0) as i64 - precpu.system_cpu_usage.unwrap_or(0) as i64;
    let online = match cpu.online_cpus {
        Some(n) if n > 0 => n as f64,
        _ => 1.0,
    };
    if system_delta > 0 && cpu_delta >= 0 {
        (cpu_delta as f64 / system_delta as f64) * online * 100.0
    } else {
        0.0
    }
}

/// Memory (usage, limit) in bytes, each zero when absent.
pub fn memory_usage(stats: &ContainerStatsResponse) -> (u64, u64) {
    let usage = stats.memory_stats.as_ref().and_then(|m| m.usage).unwrap_or(0);
    let limit = stats.memory_stats.as_ref().and_then(|m| m.limit).unwrap_or(0);
    (usage, limit)
}

/// Memory usage percentage; zero when the limit is zero.
pub fn memory_percent(usage: u64, limit: u64) -> f64 {
    if limit > 0 {
        (usage as f64 / limit as f64) * 100.0
    } else {
        0.0
    }
}

/// Total (rx, tx) bytes summed across all network interfaces.
pub fn network_io(stats: &ContainerStatsResponse) -> (u64, u64) {
    stats.networks.as_ref().map_or((0, 0), |interfaces| {
        let mut rx = 0u64;
        let mut tx = 0u64;
        for v in interfaces.values() {
            rx += v.rx_bytes.unwrap_or(0);
            tx += v.tx_bytes.unwrap_or(0);
        }
        (rx, tx)
    })
}

/// Total (read, write) bytes from the block-IO service-bytes counters.
pub fn block_io(stats: &ContainerStatsResponse) -> (u64, u64) {
    stats
        .blkio_stats
        .as_ref()
        .and_then(|b| b.io_service_bytes_recursive.as_ref())
        .map_or((0, 0), |entries| {
            let mut read = 0u64;
            let mut write = 0u64;
            for e in entries {
                if e.op.as_ref().is_some_and(|op| op.eq_ignore_ascii_case("read")) {
                    read += e.value.unwrap_or(0);
                } else if e
                    .op
                    .as_ref()
                    .is_some_and(|op| op.eq_ignore_ascii_case("write"))
                {
                    write += e.value.unwrap_or(0);
                }
            }
            (read, write)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bollard::models::{
        ContainerBlkioStatEntry, ContainerBlkioStats, ContainerCpuStats, ContainerCpuUsage,
        ContainerMemoryStats, ContainerNetworkStats,
    };
    use std::collections::HashMap;

    fn cpu_stats(total_usage: u64, system_cpu_usage: u64, online: Option<u32>) -> ContainerCpuStats {
        ContainerCpuStats {
            cpu_usage: Some(ContainerCpuUsage {
                total_usage: Some(total_usage),
                ..Default::default()
            }),
            system_cpu_usage: Some(system_cpu_usage),
            online_cpus: online,
            throttling_data: None,
        }
    }

    #[test]
    fn cpu_percent_scales_by_online_cpus() {
        let s = ContainerStatsResponse {
            cpu_stats: Some(cpu_stats(100, 1000, Some(2))),
            precpu_stats: Some(cpu_stats(50, 500, Some(2))),
            ..Default::default()
        };
        // (50 / 500) * 2 * 100 = 20
        assert!((cpu_percent(&s) - 20.0).abs() < 1e-9);
    }

    #[test]
    fn cpu_percent_zero_when_system_delta_not_positive() {
        let s = ContainerStatsResponse {
            cpu_stats: Some(cpu_stats(100, 500, Some(1))),
            precpu_stats: Some(cpu_stats(50, 500, Some(1))),
            ..Default::default()
        };
        assert_eq!(cpu_percent(&s), 0.0);
    }

    #[test]
    fn cpu_percent_zero_when_counter_goes_backwards() {
        let s = ContainerStatsResponse {
            cpu_stats: Some(cpu_stats(40, 1000, Some(1))),
            precpu_stats: Some(cpu_stats(50, 500, Some(1))),
            ..Default::default()
        };
        assert_eq!(cpu_percent(&s), 0.0);
    }

    #[test]
    fn cpu_percent_defaults_missing_cpu_count_to_one() {
        let s = ContainerStatsResponse {
            cpu_stats: Some(cpu_stats(100, 1000, None)),
            precpu_stats: Some(cpu_stats(50, 500, None)),
            ..Default::default()
        };
        // (50 / 500) * 1 * 100 = 10
        assert!((cpu_percent(&s) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn cpu_percent_zero_when_samples_missing() {
        assert_eq!(cpu_percent(&ContainerStatsResponse::default()), 0.0);
    }

    #[test]
    fn memory_defaults_to_zero() {
        assert_eq!(memory_usage(&ContainerStatsResponse::default()), (0, 0));
    }

    #[test]
    fn memory_usage_reads_usage_and_limit() {
        let s = ContainerStatsResponse {
            memory_stats: Some(ContainerMemoryStats {
                usage: Some(512),
                limit: Some(2048),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(memory_usage(&s), (512, 2048));
    }

    #[test]
    fn memory_percent_zero_limit() {
        assert_eq!(memory_percent(100, 0), 0.0);
        assert!((memory_percent(512, 1024) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn network_io_sums_interfaces() {
        let mut networks = HashMap::new();
        networks.insert(
            "eth0".to_string(),
            ContainerNetworkStats {
                rx_bytes: Some(1000),
                tx_bytes: Some(2000),
                ..Default::default()
            },
        );
        networks.insert(
            "eth1".to_string(),
            ContainerNetworkStats {
                rx_bytes: Some(10),
                tx_bytes: Some(20),
                ..Default::default()
            },
        );
        let s = ContainerStatsResponse {
            networks: Some(networks),
            ..Default::default()
        };
        assert_eq!(network_io(&s), (1010, 2020));
    }

    #[test]
    fn network_io_zero_when_map_missing() {
        assert_eq!(network_io(&ContainerStatsResponse::default()), (0, 0));
    }

    #[test]
    fn block_io_sums_case_insensitive_ops() {
        let entry = |op: &str, value: u64| ContainerBlkioStatEntry {
            op: Some(op.to_string()),
            value: Some(value),
            ..Default::default()
        };
        let s = ContainerStatsResponse {
            blkio_stats: Some(ContainerBlkioStats {
                io_service_bytes_recursive: Some(vec![
                    entry("Read", 200),
                    entry("read", 50),
                    entry("Write", 100),
                    entry("write", 25),
                    entry("sync", 999),
                ]),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(block_io(&s), (250, 125));
    }

    #[test]
    fn block_io_zero_when_entries_missing() {
        assert_eq!(block_io(&ContainerStatsResponse::default()), (0, 0));
    }
}
