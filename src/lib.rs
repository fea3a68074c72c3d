//! # boxinfo - set-top box status snapshots
//!
//! Collects the operational status of a set-top box (hardware identity,
//! software versions, memory, network interfaces, storage, network shares,
//! tuners and what they are doing) into one serializable [`Snapshot`] for a
//! web front end.
//!
//! ## Features
//!
//! - **Partial failure tolerance**: every fact source is queried independently
//!   under a timeout; anything unavailable is replaced by a sentinel value
//! - **Memoization**: the last full snapshot is cached until a caller forces a
//!   refresh
//! - **Live session facts**: stream clients, recording and live tuners, signal
//!   readings and playback status when a [`SessionContext`] is supplied
//! - **Pluggable hosts**: [`LinuxHost`] reads procfs/sysfs, the
//!   [`host::mock`] providers serve tests and benchmarks
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use boxinfo::{AggregatorConfig, LinuxHost, Providers, SnapshotAggregator, SnapshotCache};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AggregatorConfig::default();
//!     let host = Arc::new(LinuxHost::new(config.clone()));
//!     let aggregator =
//!         SnapshotAggregator::new(Providers::from_host(host), config, Arc::new(SnapshotCache::new()));
//!
//!     let snapshot = aggregator.snapshot(None, true).await;
//!     println!("{}", serde_json::to_string_pretty(&*snapshot)?);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod host;
pub mod parsers;
pub mod status;

// Re-export public API
pub use config::AggregatorConfig;
pub use error::{Result, SystemError};
pub use host::{IdleSession, LinuxHost, MockHost, MockSession};
pub use status::{
    aggregator::{Providers, SnapshotAggregator},
    cache::SnapshotCache,
    data::{
        CurrentTime, FieldValue, FrontendStatus, HardwareInfo, InterfaceInfo, MemoryStats,
        PipStatus, ShareInfo, Snapshot, StatusInfo, StreamInfo, TunerInfo, VersionInfo,
        VolumeInfo,
    },
    live::current_time,
    traits::SessionContext,
};

/// The default per-provider timeout in milliseconds
pub const DEFAULT_PROVIDER_TIMEOUT_MS: u64 = 2000;
