//! Capability traits for the fact providers the aggregator depends on.
//!
//! Each host capability is one narrow, read-only query. Implementations
//! report failures as [`SystemError`](crate::SystemError); the aggregator
//! decides which sentinel replaces a failed fact.

use crate::error::Result;
use crate::status::data::{HardwareInfo, VersionInfo};
use async_trait::async_trait;
use std::time::Duration;

/// Raw memory counters in kB.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryTotals {
    pub total_kb: u64,
    /// MemFree + Buffers + Cached
    pub free_kb: u64,
}

/// Adapter configuration as the network manager reports it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdapterConfig {
    pub name: String,
    pub mac: String,
    pub dhcp: bool,
    pub ip: Option<[u8; 4]>,
    pub netmask: Option<[u8; 4]>,
    pub gateway: Option<[u8; 4]>,
}

/// A storage volume before formatting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawVolume {
    pub model: String,
    /// Mount point, `None` when the volume is not mounted
    pub mount: Option<String>,
    /// Space available to unprivileged users
    pub free_bytes: Option<u64>,
    /// Nominal size in decimal MB
    pub nominal_mb: u64,
}

/// One tuner slot as the tuner manager describes it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TunerSlot {
    pub slot: usize,
    pub slot_name: String,
    pub nim_name: String,
    pub friendly_type: String,
}

/// Tuning parameters of the transponder a frontend is locked to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransponderData {
    /// "DVB-S", "DVB-C", "DVB-T", ...
    pub tuner_type: String,
    /// Tenths of a degree, satellite only
    pub orbital_position: Option<i32>,
    /// Delivery system; 1 means second generation (S2/T2/C2)
    pub system: Option<i32>,
}

/// Frontend in use by a recording or the live service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontendInfo {
    pub tuner_type: Option<String>,
    pub tuner_number: Option<usize>,
    pub transponder: Option<TransponderData>,
}

/// Raw signal readings, each a fraction of 65535 except the dB value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignalReadings {
    pub signal_quality: Option<u64>,
    /// Hundredths of a dB
    pub signal_quality_db: Option<i64>,
    pub signal_power: Option<u64>,
    pub bit_error_rate: Option<u64>,
}

/// A client connected to the native stream server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamClient {
    pub ip: String,
    pub service_ref: String,
    pub service_name: Option<String>,
    pub transcoding: bool,
}

/// A stream served over HTTP by the web interface itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpStream {
    pub service_ref: String,
    pub client_ip: String,
    /// Name of the TV channel carrying `service_ref`, if it is one
    pub channel_name: Option<String>,
}

/// A record timer entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordTimer {
    pub service_name: String,
    pub name: String,
    pub running: bool,
    /// Zap-only timers do not record
    pub justplay: bool,
}

/// An EPG event: begin/end are unix timestamps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EpgEvent {
    pub id: i64,
    pub begin: i64,
    pub end: i64,
    pub name: String,
    pub description: String,
    pub extended_description: String,
}

/// The service currently shown on the main screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayingService {
    pub service_ref: String,
    /// Name the service reports about itself
    pub name: String,
    /// Station name from the service list, `None` if unlisted
    pub station: Option<String>,
    pub event: Option<EpgEvent>,
    pub frontend: Option<FrontendInfo>,
    pub signal: Option<SignalReadings>,
}

/// Audio volume state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VolumeState {
    pub volume: u32,
    pub muted: bool,
}

#[async_trait]
pub trait HardwareProvider: Send + Sync {
    /// Hardware identity; the friendly chipset fields are derived by the aggregator.
    async fn hardware(&self) -> Result<HardwareInfo>;
}

#[async_trait]
pub trait VersionProvider: Send + Sync {
    /// Software versions; `webif_version` is filled in by the aggregator.
    async fn versions(&self) -> Result<VersionInfo>;
}

#[async_trait]
pub trait MemoryInfoProvider: Send + Sync {
    async fn memory(&self) -> Result<MemoryTotals>;
}

#[async_trait]
pub trait UptimeProvider: Send + Sync {
    async fn uptime(&self) -> Result<Duration>;
}

#[async_trait]
pub trait InterfaceEnumerator: Send + Sync {
    /// Configured adapters, in display order.
    async fn adapters(&self) -> Result<Vec<AdapterConfig>>;
}

#[async_trait]
pub trait LinkSpeedReader: Send + Sync {
    /// Raw link speed text in MBit/s.
    async fn link_speed(&self, iface: &str) -> Result<String>;
}

#[async_trait]
pub trait NicDriverReader: Send + Sync {
    /// Kernel driver bound to the interface.
    async fn nic_driver(&self, iface: &str) -> Result<String>;
}

#[async_trait]
pub trait NetworkConfigSource: Send + Sync {
    /// Text of the interfaces configuration file.
    async fn interfaces_config(&self) -> Result<String>;
}

#[async_trait]
pub trait Ipv6TableReader: Send + Sync {
    /// Text of the kernel IPv6 address table, `None` on IPv4-only kernels.
    async fn inet6_table(&self) -> Result<Option<String>>;
}

#[async_trait]
pub trait VolumeEnumerator: Send + Sync {
    async fn volumes(&self) -> Result<Vec<RawVolume>>;
}

#[async_trait]
pub trait MountTableSource: Send + Sync {
    /// Text of every network share map that exists.
    async fn mount_tables(&self) -> Result<Vec<String>>;
}

#[async_trait]
pub trait AddressResolver: Send + Sync {
    /// First IPv6 address in brackets, else first IPv4 address.
    async fn resolve(&self, host: &str) -> Result<Option<String>>;
}

#[async_trait]
pub trait TunerEnumerator: Send + Sync {
    async fn slots(&self) -> Result<Vec<TunerSlot>>;
}

/// Live playback/recording context.
///
/// Only available while the media runtime is up; snapshots taken without one
/// carry static facts only.
#[async_trait]
pub trait SessionContext: Send + Sync {
    /// Clients of the native stream server.
    async fn stream_clients(&self) -> Result<Vec<StreamClient>>;

    /// Streams served over HTTP.
    async fn http_streams(&self) -> Result<Vec<HttpStream>>;

    /// Frontend of every active recording (`None` for file-based ones).
    async fn recordings(&self) -> Result<Vec<Option<FrontendInfo>>>;

    async fn record_timers(&self) -> Result<Vec<RecordTimer>>;

    async fn current_service(&self) -> Result<Option<PlayingService>>;

    async fn volume(&self) -> Result<VolumeState>;

    async fn in_standby(&self) -> Result<bool>;

    async fn pip_shown(&self) -> Result<bool>;

    /// Name of any service reference.
    async fn service_name(&self, service_ref: &str) -> Result<Option<String>>;

    /// Name of the event currently running on a service.
    async fn current_event_name(&self, service_ref: &str) -> Result<Option<String>>;

    /// Members of an alternative service group.
    async fn alternatives(&self, service_ref: &str) -> Result<Vec<String>>;
}
