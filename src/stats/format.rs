// Byte-count and timestamp formatting for the enriched views.

use chrono::{DateTime, Local, Utc};

const DECIMAL_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
const BINARY_UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];

// Both variants scale by 1024 and differ only in labels; the upstream agent
// behaves this way and the dashboard expects it, so it is kept verbatim.
fn format_bytes(bytes: u64, units: &[&str; 5]) -> String {
    if bytes == 0 {
        return "0B".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < units.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let scaled = if value < 10.0 {
        format!("{:.2}", value)
    } else if value < 100.0 {
        format!("{:.1}", value)
    } else {
        format!("{:.0}", value)
    };
    format!("{}{}", scaled, units[unit])
}

/// Human byte count with SI-style labels (KB/MB/GB/TB).
pub fn format_bytes_decimal(bytes: u64) -> String {
    format_bytes(bytes, &DECIMAL_UNITS)
}

/// Human byte count with IEC labels (KiB/MiB/GiB/TiB).
pub fn format_bytes_binary(bytes: u64) -> String {
    format_bytes(bytes, &BINARY_UNITS)
}

/// Elapsed time since a creation timestamp, e.g. "3d2h05m" or "1h07m".
pub fn format_uptime(created_epoch_secs: i64) -> String {
    format_uptime_at(created_epoch_secs, Utc::now().timestamp())
}

/// Like [`format_uptime`] with an explicit "now", for deterministic tests.
pub fn format_uptime_at(created_epoch_secs: i64, now_epoch_secs: i64) -> String {
    let elapsed = (now_epoch_secs - created_epoch_secs).max(0);
    let days = elapsed / 86_400;
    let hours = (elapsed % 86_400) / 3_600;
    let minutes = (elapsed % 3_600) / 60;
    if days > 0 {
        format!("{}d{}h{:02}m", days, hours, minutes)
    } else {
        format!("{}h{:02}m", hours, minutes)
    }
}

/// Local calendar timestamp: "YYYY-MM-DD HH:MM:SS +HHMM Europe/Berlin".
pub fn format_created_at(epoch_secs: i64) -> String {
    let dt = DateTime::<Utc>::from_timestamp(epoch_secs, 0)
        .unwrap_or_default()
        .with_timezone(&Local);
    let zone = iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string());
    format!("{} {}", dt.format("%Y-%m-%d %H:%M:%S %z"), zone)
}
