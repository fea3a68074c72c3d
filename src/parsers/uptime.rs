//! `/proc/uptime` parsing.

use crate::error::{Result, SystemError};
use std::time::Duration;

/// First field of `/proc/uptime`, truncated to whole seconds.
pub fn parse_uptime(text: &str) -> Result<Duration> {
    let first = text
        .split_whitespace()
        .next()
        .ok_or_else(|| SystemError::parse_error("empty uptime"))?;
    let seconds: f64 = first
        .parse()
        .map_err(|e| SystemError::parse_error(format!("uptime {:?}: {}", first, e)))?;
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(SystemError::parse_error(format!("uptime {:?} out of range", first)));
    }
    Ok(Duration::from_secs(seconds.trunc() as u64))
}
