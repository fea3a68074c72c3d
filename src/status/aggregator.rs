//! Snapshot aggregation over the fact providers.

use crate::config::AggregatorConfig;
use crate::error::{Result, SystemError};
use crate::parsers::{autofs, inet6, interfaces};
use crate::status::cache::SnapshotCache;
use crate::status::data::*;
use crate::status::format;
use crate::status::traits::*;
use futures_util::future::join_all;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The host capabilities a [`SnapshotAggregator`] reads from.
#[derive(Clone)]
pub struct Providers {
    pub hardware: Arc<dyn HardwareProvider>,
    pub versions: Arc<dyn VersionProvider>,
    pub memory: Arc<dyn MemoryInfoProvider>,
    pub uptime: Arc<dyn UptimeProvider>,
    pub interfaces: Arc<dyn InterfaceEnumerator>,
    pub link_speed: Arc<dyn LinkSpeedReader>,
    pub nic_driver: Arc<dyn NicDriverReader>,
    pub network_config: Arc<dyn NetworkConfigSource>,
    pub ipv6_table: Arc<dyn Ipv6TableReader>,
    pub volumes: Arc<dyn VolumeEnumerator>,
    pub mount_tables: Arc<dyn MountTableSource>,
    pub resolver: Arc<dyn AddressResolver>,
    pub tuners: Arc<dyn TunerEnumerator>,
}

impl Providers {
    /// Use one host object for every capability.
    pub fn from_host<H>(host: Arc<H>) -> Self
    where
        H: HardwareProvider
            + VersionProvider
            + MemoryInfoProvider
            + UptimeProvider
            + InterfaceEnumerator
            + LinkSpeedReader
            + NicDriverReader
            + NetworkConfigSource
            + Ipv6TableReader
            + VolumeEnumerator
            + MountTableSource
            + AddressResolver
            + TunerEnumerator
            + 'static,
    {
        Self {
            hardware: host.clone(),
            versions: host.clone(),
            memory: host.clone(),
            uptime: host.clone(),
            interfaces: host.clone(),
            link_speed: host.clone(),
            nic_driver: host.clone(),
            network_config: host.clone(),
            ipv6_table: host.clone(),
            volumes: host.clone(),
            mount_tables: host.clone(),
            resolver: host.clone(),
            tuners: host,
        }
    }
}

/// Builds device snapshots and memoizes the last full one.
pub struct SnapshotAggregator {
    providers: Providers,
    config: AggregatorConfig,
    cache: Arc<SnapshotCache>,
}

impl SnapshotAggregator {
    pub fn new(providers: Providers, config: AggregatorConfig, cache: Arc<SnapshotCache>) -> Self {
        Self {
            providers,
            config,
            cache,
        }
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<SnapshotCache> {
        &self.cache
    }

    /// Return the cached snapshot, or build a new one.
    ///
    /// `force_full` skips the cache and always re-polls every provider. Host
    /// fact failures become sentinels; failures while correlating session
    /// state are reported in [`Snapshot::error`].
    pub async fn snapshot(
        &self,
        session: Option<&dyn SessionContext>,
        force_full: bool,
    ) -> Arc<Snapshot> {
        if !force_full {
            if let Some(cached) = self.cache.get().await {
                debug!("serving cached snapshot");
                return cached;
            }
        }

        let mut snapshot = self.collect_host_facts().await;
        if let Some(session) = session {
            self.collect_session_facts(session, &mut snapshot).await;
        }

        let snapshot = Arc::new(snapshot);
        self.cache.set(snapshot.clone()).await;
        info!(
            tuners = snapshot.tuners.len(),
            ifaces = snapshot.interfaces.len(),
            volumes = snapshot.volumes.len(),
            shares = snapshot.shares.len(),
            "snapshot refreshed"
        );
        snapshot
    }

    /// Run a provider call under the configured timeout.
    pub(crate) async fn bounded<T>(
        &self,
        provider: &'static str,
        call: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        match tokio::time::timeout(self.config.provider_timeout(), call).await {
            Ok(result) => result,
            Err(_) => Err(SystemError::Timeout {
                provider,
                timeout_ms: self.config.provider_timeout_ms,
            }),
        }
    }

    /// Like [`bounded`](Self::bounded), but a failure is logged and turned
    /// into `None` for the caller to replace with its sentinel.
    pub(crate) async fn settle<T>(
        &self,
        fact: &'static str,
        call: impl Future<Output = Result<T>>,
    ) -> Option<T> {
        match self.bounded(fact, call).await {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(fact, error = %err, "fact unavailable, using sentinel");
                None
            }
        }
    }

    async fn collect_host_facts(&self) -> Snapshot {
        let p = &self.providers;
        let (hardware, versions, memory, uptime, tuners, interfaces, volumes, shares) = tokio::join!(
            self.settle("hardware", p.hardware.hardware()),
            self.settle("versions", p.versions.versions()),
            self.settle("memory", p.memory.memory()),
            self.settle("uptime", p.uptime.uptime()),
            self.collect_tuners(),
            self.collect_interfaces(),
            self.collect_volumes(),
            self.collect_shares(),
        );

        let mut versions = versions.unwrap_or_default();
        versions.webif_version = self.config.webif_version.clone();

        Snapshot {
            hardware: with_friendly_chipset(hardware.unwrap_or_default()),
            memory: memory
                .map(|m| MemoryStats::from_kb(m.total_kb, m.free_kb))
                .unwrap_or_default(),
            uptime: uptime
                .map(format::uptime_text)
                .unwrap_or_else(|| "?".to_string()),
            versions,
            tuners,
            interfaces,
            volumes,
            shares,
            transcoding: self.config.transcoding,
            error: String::new(),
            streams: None,
        }
    }

    async fn collect_tuners(&self) -> Vec<TunerInfo> {
        let mut slots = self
            .settle("tuners", self.providers.tuners.slots())
            .await
            .unwrap_or_default();
        slots.sort_by_key(|slot| slot.slot);
        slots
            .into_iter()
            .map(|slot| TunerInfo {
                slot: slot.slot,
                name: slot.slot_name,
                kind: format!("{} ({})", slot.nim_name, slot.friendly_type),
                rec: String::new(),
                live: String::new(),
            })
            .collect()
    }

    async fn collect_interfaces(&self) -> Vec<InterfaceInfo> {
        let p = &self.providers;
        let (adapters, config_text, inet6_table) = tokio::join!(
            self.settle("interfaces", p.interfaces.adapters()),
            self.settle("network config", p.network_config.interfaces_config()),
            self.settle("ipv6 table", p.ipv6_table.inet6_table()),
        );
        let config_text = config_text.unwrap_or_default();
        let inet6_table = inet6_table.flatten();

        join_all(adapters.unwrap_or_default().into_iter().map(|adapter| {
            self.describe_interface(adapter, &config_text, inet6_table.as_deref())
        }))
        .await
    }

    async fn describe_interface(
        &self,
        adapter: AdapterConfig,
        config_text: &str,
        inet6_table: Option<&str>,
    ) -> InterfaceInfo {
        let p = &self.providers;
        let (speed, driver) = tokio::join!(
            self.settle("link speed", p.link_speed.link_speed(&adapter.name)),
            self.settle("nic driver", p.nic_driver.nic_driver(&adapter.name)),
        );
        let ipv6 = inet6::ipv6_summary(inet6_table, &adapter.name);

        InterfaceInfo {
            friendly_nic: format::friendly_nic(driver.as_deref().unwrap_or(UNKNOWN)),
            link_speed: format::link_speed_label(speed.as_deref()),
            mac: adapter.mac,
            dhcp: adapter.dhcp,
            ipv4_method: interfaces::ipv4_method(config_text, &adapter.name),
            ip: format::format_ipv4(adapter.ip),
            mask: format::format_ipv4(adapter.netmask),
            v4_prefix: format::prefix_length(adapter.netmask),
            gateway: format::format_ipv4(adapter.gateway),
            ipv6: ipv6.addresses,
            ipv6_method: interfaces::ipv6_method(config_text, &adapter.name),
            first_public: ipv6.first_public,
            name: adapter.name,
        }
    }

    async fn collect_volumes(&self) -> Vec<VolumeInfo> {
        self.settle("volumes", self.providers.volumes.volumes())
            .await
            .unwrap_or_default()
            .into_iter()
            .map(describe_volume)
            .collect()
    }

    async fn collect_shares(&self) -> Vec<ShareInfo> {
        let tables = self
            .settle("mount tables", self.providers.mount_tables.mount_tables())
            .await
            .unwrap_or_default();
        let entries: Vec<autofs::ShareEntry> = tables
            .iter()
            .flat_map(|text| autofs::parse_mount_table(text))
            .collect();

        join_all(entries.into_iter().map(|entry| self.describe_share(entry))).await
    }

    async fn describe_share(&self, entry: autofs::ShareEntry) -> ShareInfo {
        let ip_address = if entry.host.is_empty() {
            None
        } else {
            self.settle("address", self.providers.resolver.resolve(&entry.host))
                .await
                .flatten()
        };
        let friendly_address = match &ip_address {
            Some(address) if *address != entry.host => format!("{} ({})", entry.host, address),
            _ => entry.host.clone(),
        };

        ShareInfo {
            name: entry.name,
            method: "autofs".to_string(),
            kind: entry.kind,
            mode: entry.mode,
            path: entry.path,
            host: entry.host,
            ip_address,
            friendly_address,
        }
    }

    async fn collect_session_facts(&self, session: &dyn SessionContext, snapshot: &mut Snapshot) {
        let streams = match self.bounded("stream clients", session.stream_clients()).await {
            Ok(clients) => clients.into_iter().map(stream_info).collect(),
            Err(err) => {
                debug!(error = %err, "no stream server");
                Vec::new()
            }
        };
        snapshot.streams = Some(streams);

        if let Err(err) = self.annotate_tuners(session, &mut snapshot.tuners).await {
            warn!(error = %err, "tuner correlation failed");
            snapshot.error = err.to_string();
        }
    }

    /// Mark the tuners feeding recordings (`rec`) and the live service (`live`).
    async fn annotate_tuners(
        &self,
        session: &dyn SessionContext,
        tuners: &mut [TunerInfo],
    ) -> Result<()> {
        let recordings = self.bounded("recordings", session.recordings()).await?;
        if !recordings.is_empty() {
            let service_name = self.recording_service_name(session).await?;
            debug!(recordings = recordings.len(), service = %service_name, "annotating recordings");
            for frontend in recordings.iter().flatten() {
                if let Some(text) = activity_text(frontend, &service_name)? {
                    tuner_at(tuners, frontend)?.rec = text;
                }
            }
        }

        let playing = self.bounded("current service", session.current_service()).await?;
        if let Some(service) = playing {
            if let Some(frontend) = &service.frontend {
                if let Some(text) = activity_text(frontend, &service.name)? {
                    tuner_at(tuners, frontend)?.live = text;
                }
            }
        }
        Ok(())
    }

    /// Name shown next to recording tuners: the single running record timer,
    /// else the channel of the single HTTP stream.
    async fn recording_service_name(&self, session: &dyn SessionContext) -> Result<String> {
        let timers = self.bounded("record timers", session.record_timers()).await?;
        let running: Vec<&RecordTimer> = timers
            .iter()
            .filter(|timer| timer.running && !timer.justplay)
            .collect();
        if let [timer] = running.as_slice() {
            return Ok(format::clean_epg_text(&timer.service_name));
        }

        let streams = self.bounded("http streams", session.http_streams()).await?;
        if let [stream] = streams.as_slice() {
            if let Some(channel) = &stream.channel_name {
                return Ok(format!("{} ({})", channel, stream.client_ip));
            }
        }
        Ok(String::new())
    }
}

fn with_friendly_chipset(mut hardware: HardwareInfo) -> HardwareInfo {
    match hardware.fp_version {
        Some(fp) if fp != 0 => {
            hardware.friendly_chipset_description = "Chipset (Frontprocessor Version)".to_string();
            hardware.friendly_chipset_text = format!("{} ({})", hardware.chipset, fp);
        }
        _ => {
            hardware.friendly_chipset_description = "Chipset".to_string();
            hardware.friendly_chipset_text = hardware.chipset.clone();
        }
    }
    hardware
}

fn describe_volume(volume: RawVolume) -> VolumeInfo {
    let free_bytes = volume.mount.as_ref().and(volume.free_bytes);
    let free = format::free_space_label(free_bytes);
    let capacity = format::capacity_label(volume.nominal_mb);
    let labelled_capacity = format::iec_label(volume.nominal_mb);
    let friendly_capacity = format::friendly_capacity(&free, &capacity, &labelled_capacity);

    VolumeInfo {
        model: volume.model,
        capacity,
        labelled_capacity,
        free,
        mount: volume.mount,
        friendly_capacity,
    }
}

fn stream_info(client: StreamClient) -> StreamInfo {
    StreamInfo {
        name: client
            .service_name
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "(unknown service)".to_string()),
        kind: if client.transcoding { "T" } else { "S" }.to_string(),
        service_ref: client.service_ref,
        ip: client.ip,
    }
}

/// "<orbital text> / <service>", or `None` when the frontend is not tuned.
fn activity_text(frontend: &FrontendInfo, service_name: &str) -> Result<Option<String>> {
    match &frontend.transponder {
        Some(transponder) => Ok(Some(format!(
            "{} / {}",
            format::orbital_text(transponder)?,
            service_name
        ))),
        None => Ok(None),
    }
}

fn tuner_at<'a>(tuners: &'a mut [TunerInfo], frontend: &FrontendInfo) -> Result<&'a mut TunerInfo> {
    let number = frontend
        .tuner_number
        .ok_or_else(|| SystemError::session_error("frontend without tuner number"))?;
    let count = tuners.len();
    tuners.iter_mut().find(|tuner| tuner.slot == number).ok_or_else(|| {
        SystemError::session_error(format!(
            "tuner {} out of range ({} slots)",
            number, count
        ))
    })
}
