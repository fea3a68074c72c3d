//! `/proc/meminfo` parsing.

use crate::error::{Result, SystemError};
use crate::status::traits::MemoryTotals;

/// Sum the reclaimable categories into the "free" figure.
///
/// `MemTotal` is required; a line that does not look like `Key: <n> kB` is
/// ignored.
pub fn parse_meminfo(text: &str) -> Result<MemoryTotals> {
    let mut total_kb = None;
    let mut free_kb = 0u64;

    for line in text.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let Some(kb) = value
            .split_whitespace()
            .next()
            .and_then(|v| v.parse::<u64>().ok())
        else {
            continue;
        };
        match key.trim() {
            "MemTotal" => total_kb = Some(kb),
            "MemFree" | "Buffers" | "Cached" => free_kb += kb,
            _ => {}
        }
    }

    let total_kb = total_kb.ok_or_else(|| SystemError::parse_error("meminfo without MemTotal"))?;
    Ok(MemoryTotals { total_kb, free_kb })
}
