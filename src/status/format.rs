//! Text formatting for snapshot fields.
//!
//! The exact rounding rules matter: the web front end and its fixtures expect
//! the same strings the box has always produced.

use crate::error::{Result, SystemError};
use crate::status::traits::TransponderData;
use std::net::Ipv6Addr;
use std::time::Duration;

const BINARY_MB: f64 = 1_048_576.0;

/// Full scale of tuner signal readings.
pub const SIGNAL_SCALE: u64 = 65_535;

/// Free space label. `None` (volume not mounted) renders as "-1 MB".
pub fn free_space_label(free_bytes: Option<u64>) -> String {
    let free_mb = match free_bytes {
        Some(bytes) => bytes as f64 / BINARY_MB,
        None => -1.0,
    };
    if free_mb <= 1024.0 {
        format!("{} MB", free_mb.trunc() as i64)
    } else {
        format!("{:.1} GB", free_mb / 1024.0)
    }
}

/// Human capacity label from a nominal size in decimal MB.
pub fn capacity_label(nominal_mb: u64) -> String {
    let size = nominal_mb as f64 * 1_000_000.0 / BINARY_MB;
    if size > BINARY_MB {
        format!("{:.1} TB", size / BINARY_MB)
    } else if size > 1024.0 {
        format!("{:.1} GB", size / 1024.0)
    } else {
        format!("{} MB", size.trunc() as u64)
    }
}

/// Manufacturer-style label from a nominal size in decimal MB.
///
/// Above 1000 GB: TB with one decimal (dropped when zero). Above ~300 GB:
/// rounded to tens of GB (320, 500, 640, 750). Above 1 GB: whole GB.
pub fn iec_label(nominal_mb: u64) -> String {
    if nominal_mb > 1_000_000 {
        let tenths = (nominal_mb + 50_000) / 100_000;
        if tenths % 10 > 0 {
            format!("{}.{} TB", tenths / 10, tenths % 10)
        } else {
            format!("{} TB", tenths / 10)
        }
    } else if nominal_mb > 300_000 {
        format!("{} GB", (nominal_mb + 5_000) / 10_000 * 10)
    } else if nominal_mb > 1_000 {
        format!("{} GB", (nominal_mb + 500) / 1_000)
    } else {
        format!("{} MB", nominal_mb)
    }
}

/// "<free> free / <capacity> ("<iec>") total"
pub fn friendly_capacity(free: &str, capacity: &str, iec: &str) -> String {
    format!("{} free / {} (\"{}\") total", free, capacity, iec)
}

/// Link speed label from the raw sysfs value; `None` renders "unknown MBit/s".
pub fn link_speed_label(raw: Option<&str>) -> String {
    let speed = raw.map(str::trim).unwrap_or(crate::status::data::UNKNOWN);
    format!("{} MBit/s", speed)
        .replace("10000 MBit/s", "10 GBit/s")
        .replace("1000 MBit/s", "1 GBit/s")
}

/// Readable NIC name for a kernel driver.
pub fn friendly_nic(driver: &str) -> String {
    driver
        .replace("bcmgenet", "Broadcom Gigabit Ethernet")
        .replace("bcmemac", "Broadcom STB 10/100 EMAC")
}

/// Canonical IPv6 text. A "/128" suffix is dropped, other prefixes are kept.
pub fn normalize_ipv6(text: &str) -> Result<String> {
    let (addr, prefix) = match text.split_once('/') {
        Some((addr, "128")) => (addr, None),
        Some((addr, prefix)) => (addr, Some(prefix)),
        None => (text, None),
    };
    let parsed: Ipv6Addr = addr
        .parse()
        .map_err(|e| SystemError::parse_error(format!("invalid IPv6 address {:?}: {}", addr, e)))?;
    Ok(match prefix {
        Some(prefix) => format!("{}/{}", parsed, prefix),
        None => parsed.to_string(),
    })
}

/// Dotted quad, "0.0.0.0" when absent.
pub fn format_ipv4(octets: Option<[u8; 4]>) -> String {
    let [a, b, c, d] = octets.unwrap_or([0; 4]);
    format!("{}.{}.{}.{}", a, b, c, d)
}

/// Number of set bits in a netmask.
pub fn prefix_length(netmask: Option<[u8; 4]>) -> u32 {
    netmask
        .unwrap_or([0; 4])
        .iter()
        .map(|octet| octet.count_ones())
        .sum()
}

/// Orbital position in tenths of a degree, e.g. 192 -> "19.2° E".
pub fn orbital_position(position: i32) -> String {
    let (position, direction) = if position > 1800 {
        (3600 - position, "W")
    } else {
        (position, "E")
    };
    format!("{}.{}° {}", position / 10, position % 10, direction)
}

/// Short description of a transponder: the orbital position for satellite,
/// otherwise the delivery system name.
pub fn orbital_text(transponder: &TransponderData) -> Result<String> {
    if transponder.tuner_type == "DVB-S" {
        let position = transponder.orbital_position.ok_or_else(|| {
            SystemError::session_error("satellite transponder without orbital position")
        })?;
        return Ok(orbital_position(position));
    }
    if transponder.system == Some(1) {
        return Ok(format!("{}2", transponder.tuner_type));
    }
    Ok(transponder.tuner_type.clone())
}

/// Uptime as "[<d>d ]<h>:<mm>".
pub fn uptime_text(uptime: Duration) -> String {
    let mut seconds = uptime.as_secs();
    let mut text = String::new();
    if seconds > 86_400 {
        text.push_str(&format!("{}d ", seconds / 86_400));
        seconds %= 86_400;
    }
    text.push_str(&format!("{}:{:02}", seconds / 3600, (seconds % 3600) / 60));
    text
}

/// Image version with an optional build suffix.
pub fn image_version_label(version: &str, build: Option<&str>) -> String {
    match build.map(str::trim).filter(|b| !b.is_empty()) {
        Some(build) => format!("{}.{}", version, build),
        None => version.to_string(),
    }
}

/// Scale a 16-bit signal reading to 0-100.
pub fn signal_percent(raw: u64) -> i64 {
    (raw * 100 / SIGNAL_SCALE) as i64
}

/// Render a signal quality given in hundredths of a dB.
pub fn signal_db(centi_db: i64) -> String {
    format!("{:3.2}", centi_db as f64 / 100.0)
}

/// Drop the EPG emphasis markers and turn the EPG line break into '\n'.
pub fn clean_epg_text(text: &str) -> String {
    text.chars()
        .filter(|c| *c != '\u{86}' && *c != '\u{87}')
        .map(|c| if c == '\u{8a}' { '\n' } else { c })
        .collect()
}

/// Cut a description to `limit` characters, marking the cut with "...".
pub fn truncate_description(text: &str, limit: usize) -> String {
    if text.chars().count() > limit {
        let mut cut: String = text.chars().take(limit).collect();
        cut.push_str("...");
        cut
    } else {
        text.to_string()
    }
}
