//! In-memory host and session used by the tests and benchmarks.

use crate::error::{Result, SystemError};
use crate::status::data::{HardwareInfo, VersionInfo};
use crate::status::traits::*;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// A host whose facts are plain fields.
///
/// Providers named in `failing` return [`SystemError::ProviderUnavailable`],
/// providers in `delays` sleep first. Every provider call is counted.
#[derive(Debug, Default)]
pub struct MockHost {
    pub hardware: HardwareInfo,
    pub versions: VersionInfo,
    pub memory: MemoryTotals,
    pub uptime: Duration,
    pub adapters: Vec<AdapterConfig>,
    pub link_speeds: HashMap<String, String>,
    pub nic_drivers: HashMap<String, String>,
    pub interfaces_config: String,
    pub inet6_table: Option<String>,
    pub volumes: Vec<RawVolume>,
    pub mount_tables: Vec<String>,
    pub addresses: HashMap<String, String>,
    pub tuners: Vec<TunerSlot>,
    pub failing: HashSet<&'static str>,
    pub delays: HashMap<&'static str, Duration>,
    calls: AtomicUsize,
}

impl MockHost {
    /// A two-tuner box with one wired interface, one disk and two shares.
    pub fn sample() -> Self {
        Self {
            hardware: HardwareInfo {
                brand: "Vu+".to_string(),
                model: "solo4k".to_string(),
                box_type: "vusolo4k".to_string(),
                machine_build: "vusolo4k".to_string(),
                lcd: 1,
                grab_pip: 1,
                chipset: "bcm7376".to_string(),
                cpu_brand: "Broadcom".to_string(),
                cpu_arch: "ARM".to_string(),
                flash_type: "eMMC".to_string(),
                fp_version: Some(2),
                ..HardwareInfo::default()
            },
            versions: VersionInfo {
                image_distro: "openatv".to_string(),
                friendly_image_distro: "openATV".to_string(),
                oe_version: "OE-Alliance 5.3".to_string(),
                image_version: "7.3.20240101".to_string(),
                runtime_version: "2024-01-01".to_string(),
                kernel_version: "4.1.20-1.9".to_string(),
                dvb_api: "DVB API 5".to_string(),
                ..VersionInfo::default()
            },
            memory: MemoryTotals {
                total_kb: 1_956_304,
                free_kb: 1_224_776,
            },
            uptime: Duration::from_secs(3 * 86_400 + 4 * 3600 + 5 * 60),
            adapters: vec![AdapterConfig {
                name: "eth0".to_string(),
                mac: "00:1d:ec:0a:0b:0c".to_string(),
                dhcp: true,
                ip: Some([192, 168, 1, 20]),
                netmask: Some([255, 255, 255, 0]),
                gateway: Some([192, 168, 1, 1]),
            }],
            link_speeds: HashMap::from([("eth0".to_string(), "1000".to_string())]),
            nic_drivers: HashMap::from([("eth0".to_string(), "bcmgenet".to_string())]),
            interfaces_config: "auto eth0\niface eth0 inet dhcp\niface eth0 inet6 auto\n".to_string(),
            inet6_table: Some(
                "20010db8000000000000000000000001 02 40 00 00     eth0\n\
                 fe80000000000000021decfffe0a0b0c 02 40 20 80     eth0\n"
                    .to_string(),
            ),
            volumes: vec![RawVolume {
                model: "WDC WD10EZEX".to_string(),
                mount: Some("/media/hdd".to_string()),
                free_bytes: Some(512 * 1_073_741_824),
                nominal_mb: 1_000_204,
            }],
            mount_tables: vec![
                "# shares\nmovies -fstype=cifs,rw,user=me,pass=a\\ b,vers=3.0 ://nas/movies\n"
                    .to_string(),
                "backup -fstype=nfs,ro nas:/export/backup\n".to_string(),
            ],
            addresses: HashMap::from([("nas".to_string(), "192.168.1.5".to_string())]),
            tuners: vec![
                TunerSlot {
                    slot: 0,
                    slot_name: "Tuner A".to_string(),
                    nim_name: "BCM45208".to_string(),
                    friendly_type: "DVB-S2".to_string(),
                },
                TunerSlot {
                    slot: 1,
                    slot_name: "Tuner B".to_string(),
                    nim_name: "Si2169C".to_string(),
                    friendly_type: "DVB-T2".to_string(),
                },
            ],
            ..Self::default()
        }
    }

    /// Make `provider` fail.
    pub fn failing(mut self, provider: &'static str) -> Self {
        self.failing.insert(provider);
        self
    }

    /// Make `provider` sleep for `delay` before answering.
    pub fn slow(mut self, provider: &'static str, delay: Duration) -> Self {
        self.delays.insert(provider, delay);
        self
    }

    /// Number of provider calls answered so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn answer<T>(&self, provider: &'static str, value: impl FnOnce() -> T) -> Result<T> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(provider) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing.contains(provider) {
            return Err(SystemError::unavailable(provider, "mock failure"));
        }
        Ok(value())
    }
}

/// Every provider name [`MockHost`] answers to.
pub const PROVIDERS: [&str; 13] = [
    "hardware",
    "versions",
    "memory",
    "uptime",
    "interfaces",
    "link speed",
    "nic driver",
    "network config",
    "ipv6 table",
    "volumes",
    "mount tables",
    "resolver",
    "tuners",
];

#[async_trait]
impl HardwareProvider for MockHost {
    async fn hardware(&self) -> Result<HardwareInfo> {
        self.answer("hardware", || self.hardware.clone()).await
    }
}

#[async_trait]
impl VersionProvider for MockHost {
    async fn versions(&self) -> Result<VersionInfo> {
        self.answer("versions", || self.versions.clone()).await
    }
}

#[async_trait]
impl MemoryInfoProvider for MockHost {
    async fn memory(&self) -> Result<MemoryTotals> {
        self.answer("memory", || self.memory).await
    }
}

#[async_trait]
impl UptimeProvider for MockHost {
    async fn uptime(&self) -> Result<Duration> {
        self.answer("uptime", || self.uptime).await
    }
}

#[async_trait]
impl InterfaceEnumerator for MockHost {
    async fn adapters(&self) -> Result<Vec<AdapterConfig>> {
        self.answer("interfaces", || self.adapters.clone()).await
    }
}

#[async_trait]
impl LinkSpeedReader for MockHost {
    async fn link_speed(&self, iface: &str) -> Result<String> {
        self.answer("link speed", || self.link_speeds.get(iface).cloned())
            .await?
            .ok_or_else(|| SystemError::unavailable("link speed", format!("no speed for {}", iface)))
    }
}

#[async_trait]
impl NicDriverReader for MockHost {
    async fn nic_driver(&self, iface: &str) -> Result<String> {
        self.answer("nic driver", || self.nic_drivers.get(iface).cloned())
            .await?
            .ok_or_else(|| SystemError::unavailable("nic driver", format!("no driver for {}", iface)))
    }
}

#[async_trait]
impl NetworkConfigSource for MockHost {
    async fn interfaces_config(&self) -> Result<String> {
        self.answer("network config", || self.interfaces_config.clone()).await
    }
}

#[async_trait]
impl Ipv6TableReader for MockHost {
    async fn inet6_table(&self) -> Result<Option<String>> {
        self.answer("ipv6 table", || self.inet6_table.clone()).await
    }
}

#[async_trait]
impl VolumeEnumerator for MockHost {
    async fn volumes(&self) -> Result<Vec<RawVolume>> {
        self.answer("volumes", || self.volumes.clone()).await
    }
}

#[async_trait]
impl MountTableSource for MockHost {
    async fn mount_tables(&self) -> Result<Vec<String>> {
        self.answer("mount tables", || self.mount_tables.clone()).await
    }
}

#[async_trait]
impl AddressResolver for MockHost {
    async fn resolve(&self, host: &str) -> Result<Option<String>> {
        self.answer("resolver", || self.addresses.get(host).cloned())
            .await?
            .map(Some)
            .ok_or_else(|| SystemError::resolution_error(host, "unknown host"))
    }
}

#[async_trait]
impl TunerEnumerator for MockHost {
    async fn slots(&self) -> Result<Vec<TunerSlot>> {
        self.answer("tuners", || self.tuners.clone()).await
    }
}

/// A session whose live state is plain fields.
#[derive(Debug, Default)]
pub struct MockSession {
    pub stream_clients: Vec<StreamClient>,
    pub http_streams: Vec<HttpStream>,
    pub recordings: Vec<Option<FrontendInfo>>,
    pub record_timers: Vec<RecordTimer>,
    pub current_service: Option<PlayingService>,
    pub volume: VolumeState,
    pub in_standby: bool,
    pub pip_shown: bool,
    pub service_names: HashMap<String, String>,
    pub event_names: HashMap<String, String>,
    pub alternatives: HashMap<String, Vec<String>>,
    /// Queries named here fail
    pub failing: HashSet<&'static str>,
}

impl MockSession {
    /// Make the session query `query` fail.
    pub fn failing(mut self, query: &'static str) -> Self {
        self.failing.insert(query);
        self
    }

    fn answer<T>(&self, query: &'static str, value: impl FnOnce() -> T) -> Result<T> {
        if self.failing.contains(query) {
            return Err(SystemError::session_error(format!("{} unavailable", query)));
        }
        Ok(value())
    }
}

#[async_trait]
impl SessionContext for MockSession {
    async fn stream_clients(&self) -> Result<Vec<StreamClient>> {
        self.answer("stream clients", || self.stream_clients.clone())
    }

    async fn http_streams(&self) -> Result<Vec<HttpStream>> {
        self.answer("http streams", || self.http_streams.clone())
    }

    async fn recordings(&self) -> Result<Vec<Option<FrontendInfo>>> {
        self.answer("recordings", || self.recordings.clone())
    }

    async fn record_timers(&self) -> Result<Vec<RecordTimer>> {
        self.answer("record timers", || self.record_timers.clone())
    }

    async fn current_service(&self) -> Result<Option<PlayingService>> {
        self.answer("current service", || self.current_service.clone())
    }

    async fn volume(&self) -> Result<VolumeState> {
        self.answer("volume", || self.volume)
    }

    async fn in_standby(&self) -> Result<bool> {
        self.answer("standby", || self.in_standby)
    }

    async fn pip_shown(&self) -> Result<bool> {
        self.answer("pip", || self.pip_shown)
    }

    async fn service_name(&self, service_ref: &str) -> Result<Option<String>> {
        self.answer("service name", || self.service_names.get(service_ref).cloned())
    }

    async fn current_event_name(&self, service_ref: &str) -> Result<Option<String>> {
        self.answer("event name", || self.event_names.get(service_ref).cloned())
    }

    async fn alternatives(&self, service_ref: &str) -> Result<Vec<String>> {
        self.answer("alternatives", || {
            self.alternatives.get(service_ref).cloned().unwrap_or_default()
        })
    }
}
