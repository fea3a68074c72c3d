//! Host adapter reading procfs, sysfs and `/etc` below a configurable root.

use crate::config::AggregatorConfig;
use crate::error::{Result, SystemError};
use crate::parsers::{cpuinfo, meminfo, nim_sockets, os_release, route, uptime};
use crate::parsers::interfaces::uses_dhcp;
use crate::status::data::{HardwareInfo, VersionInfo, UNKNOWN};
use crate::status::format::image_version_label;
use crate::status::traits::*;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use sysinfo::{Disks, Networks, System};
use tracing::debug;

/// Reads host facts the way a running box exposes them.
///
/// Every path is resolved against [`AggregatorConfig::root`], so the adapter
/// can run against a copied fixture tree. Facts only `sysinfo` knows about
/// (interface addresses, mounted disks) always come from the running system;
/// disks are limited to mount points below the root.
#[derive(Debug, Clone)]
pub struct LinuxHost {
    config: AggregatorConfig,
}

impl LinuxHost {
    pub fn new(config: AggregatorConfig) -> Self {
        Self { config }
    }

    fn path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.config.host_path(relative)
    }

    /// Read a root-relative file.
    async fn read(&self, provider: &'static str, relative: impl AsRef<Path>) -> Result<String> {
        let path = self.path(relative);
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| SystemError::unavailable(provider, format!("{}: {}", path.display(), e)))
    }

    /// Read a root-relative file that may legitimately be absent.
    async fn read_optional(&self, relative: impl AsRef<Path>) -> Result<Option<String>> {
        match tokio::fs::read_to_string(self.path(relative)).await {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn read_trimmed(&self, relative: impl AsRef<Path>) -> Option<String> {
        self.read_optional(relative)
            .await
            .ok()
            .flatten()
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
    }

    async fn exists(&self, relative: impl AsRef<Path>) -> bool {
        tokio::fs::metadata(self.path(relative)).await.is_ok()
    }

    async fn interface_names(&self) -> Result<Vec<String>> {
        let dir = self.path("sys/class/net");
        let mut entries = tokio::fs::read_dir(&dir)
            .await
            .map_err(|e| SystemError::unavailable("interfaces", format!("{}: {}", dir.display(), e)))?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name != "lo" {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }
}

/// IPv4 address and netmask per interface from the running system.
async fn ipv4_networks() -> Result<Vec<(String, [u8; 4], [u8; 4])>> {
    tokio::task::spawn_blocking(|| {
        let networks = Networks::new_with_refreshed_list();
        networks
            .iter()
            .filter_map(|(name, data)| {
                data.ip_networks().iter().find_map(|network| match network.addr {
                    IpAddr::V4(addr) => Some((name.clone(), addr.octets(), netmask(network.prefix))),
                    IpAddr::V6(_) => None,
                })
            })
            .collect()
    })
    .await
    .map_err(|e| SystemError::unavailable("interfaces", e.to_string()))
}

fn netmask(prefix: u8) -> [u8; 4] {
    let bits = u32::MAX.checked_shl(32 - u32::from(prefix.min(32))).unwrap_or(0);
    bits.to_be_bytes()
}

#[async_trait]
impl HardwareProvider for LinuxHost {
    async fn hardware(&self) -> Result<HardwareInfo> {
        let cpu = cpuinfo::parse_cpuinfo(&self.read("hardware", "proc/cpuinfo").await?);
        let box_type = self.read_trimmed("proc/stb/info/boxtype").await;
        let model = match self.read_trimmed("proc/stb/info/model").await {
            Some(model) => Some(model),
            None => self.read_trimmed("sys/firmware/devicetree/base/model").await,
        };
        let chipset = match self.read_trimmed("proc/stb/info/chipset").await {
            Some(chipset) => Some(chipset),
            None => cpu.hardware.clone(),
        };
        let fp_version = self
            .read_trimmed("proc/stb/fp/version")
            .await
            .and_then(|v| v.parse::<u32>().ok());

        let unknown = || UNKNOWN.to_string();
        Ok(HardwareInfo {
            brand: self.read_trimmed("proc/stb/info/brand").await.unwrap_or_else(unknown),
            model: model.clone().unwrap_or_else(unknown),
            box_type: box_type.clone().or(model).unwrap_or_else(unknown),
            machine_build: box_type.unwrap_or_else(unknown),
            lcd: u32::from(self.exists("proc/stb/lcd").await),
            grab_pip: u32::from(self.exists("proc/stb/vmpeg/1").await),
            chipset: chipset.unwrap_or_else(unknown),
            cpu_brand: cpu.brand.unwrap_or_else(unknown),
            cpu_arch: cpu.architecture.unwrap_or_else(unknown),
            flash_type: self
                .read_trimmed("proc/stb/info/flashtype")
                .await
                .unwrap_or_else(unknown),
            fp_version,
            ..HardwareInfo::default()
        })
    }
}

#[async_trait]
impl VersionProvider for LinuxHost {
    async fn versions(&self) -> Result<VersionInfo> {
        let release = os_release::parse_os_release(&self.read("versions", "etc/os-release").await?);
        let field = |key: &str| release.get(key).cloned();
        let unknown = || UNKNOWN.to_string();

        let kernel_version = match self.read_trimmed("proc/sys/kernel/osrelease").await {
            Some(version) => Some(version),
            None => tokio::task::spawn_blocking(System::kernel_version)
                .await
                .ok()
                .flatten(),
        };
        let image_version = field("VERSION_ID")
            .map(|version| image_version_label(&version, field("BUILD_ID").as_deref()));

        Ok(VersionInfo {
            image_distro: field("ID").unwrap_or_else(unknown),
            friendly_image_distro: field("NAME").unwrap_or_else(unknown),
            oe_version: field("VERSION_CODENAME").unwrap_or_else(unknown),
            image_version: image_version.unwrap_or_else(unknown),
            kernel_version: kernel_version.unwrap_or_else(unknown),
            dvb_api: if self.exists("dev/dvb").await {
                "DVB API 5".to_string()
            } else {
                unknown()
            },
            ..VersionInfo::default()
        })
    }
}

#[async_trait]
impl MemoryInfoProvider for LinuxHost {
    async fn memory(&self) -> Result<MemoryTotals> {
        meminfo::parse_meminfo(&self.read("memory", "proc/meminfo").await?)
    }
}

#[async_trait]
impl UptimeProvider for LinuxHost {
    async fn uptime(&self) -> Result<Duration> {
        uptime::parse_uptime(&self.read("uptime", "proc/uptime").await?)
    }
}

#[async_trait]
impl InterfaceEnumerator for LinuxHost {
    async fn adapters(&self) -> Result<Vec<AdapterConfig>> {
        let names = self.interface_names().await?;
        let routes = self.read_optional("proc/net/route").await?.unwrap_or_default();
        let config = self
            .read_optional("etc/network/interfaces")
            .await?
            .unwrap_or_default();
        let addresses = ipv4_networks().await.unwrap_or_else(|err| {
            debug!(error = %err, "no interface addresses");
            Vec::new()
        });

        let mut adapters = Vec::with_capacity(names.len());
        for name in names {
            let address = addresses.iter().find(|(iface, _, _)| *iface == name);
            adapters.push(AdapterConfig {
                mac: self
                    .read_trimmed(format!("sys/class/net/{}/address", name))
                    .await
                    .unwrap_or_else(|| "00:00:00:00:00:00".to_string()),
                dhcp: uses_dhcp(&config, &name),
                ip: address.map(|(_, ip, _)| *ip),
                netmask: address.map(|(_, _, mask)| *mask),
                gateway: route::default_gateway(&routes, &name),
                name,
            });
        }
        Ok(adapters)
    }
}

#[async_trait]
impl LinkSpeedReader for LinuxHost {
    async fn link_speed(&self, iface: &str) -> Result<String> {
        let speed = self
            .read("link speed", format!("sys/class/net/{}/speed", iface))
            .await?;
        Ok(speed.trim().to_string())
    }
}

#[async_trait]
impl NicDriverReader for LinuxHost {
    async fn nic_driver(&self, iface: &str) -> Result<String> {
        let link = self.path(format!("sys/class/net/{}/device/driver", iface));
        let target = tokio::fs::read_link(&link)
            .await
            .map_err(|e| SystemError::unavailable("nic driver", format!("{}: {}", link.display(), e)))?;
        target
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| SystemError::unavailable("nic driver", "driver link has no name"))
    }
}

#[async_trait]
impl NetworkConfigSource for LinuxHost {
    async fn interfaces_config(&self) -> Result<String> {
        self.read("network config", "etc/network/interfaces").await
    }
}

#[async_trait]
impl Ipv6TableReader for LinuxHost {
    async fn inet6_table(&self) -> Result<Option<String>> {
        self.read_optional("proc/net/if_inet6").await
    }
}

#[async_trait]
impl VolumeEnumerator for LinuxHost {
    async fn volumes(&self) -> Result<Vec<RawVolume>> {
        let root = self.config.root.clone();
        tokio::task::spawn_blocking(move || {
            let disks = Disks::new_with_refreshed_list();
            disks
                .iter()
                .filter(|disk| disk.mount_point().starts_with(&root))
                .map(|disk| RawVolume {
                    model: disk.name().to_string_lossy().into_owned(),
                    mount: Some(disk.mount_point().to_string_lossy().into_owned()),
                    free_bytes: Some(disk.available_space()),
                    nominal_mb: disk.total_space() / 1_000_000,
                })
                .collect()
        })
        .await
        .map_err(|e| SystemError::unavailable("volumes", e.to_string()))
    }
}

#[async_trait]
impl MountTableSource for LinuxHost {
    async fn mount_tables(&self) -> Result<Vec<String>> {
        let mut tables = Vec::new();
        for table in &self.config.mount_tables {
            match self.read_optional(table).await {
                Ok(Some(text)) => tables.push(text),
                Ok(None) => {}
                Err(err) => debug!(table = %table.display(), error = %err, "skipping unreadable mount table"),
            }
        }
        Ok(tables)
    }
}

#[async_trait]
impl AddressResolver for LinuxHost {
    async fn resolve(&self, host: &str) -> Result<Option<String>> {
        let addresses: Vec<IpAddr> = tokio::net::lookup_host((host, 0))
            .await
            .map_err(|e| SystemError::resolution_error(host, e.to_string()))?
            .map(|addr| addr.ip())
            .collect();

        let v6 = addresses.iter().find(|addr| addr.is_ipv6());
        let v4 = addresses.iter().find(|addr| addr.is_ipv4());
        Ok(match (v6, v4) {
            (Some(v6), _) => Some(format!("[{}]", v6)),
            (None, Some(v4)) => Some(v4.to_string()),
            (None, None) => None,
        })
    }
}

#[async_trait]
impl TunerEnumerator for LinuxHost {
    async fn slots(&self) -> Result<Vec<TunerSlot>> {
        Ok(self
            .read_optional("proc/bus/nim_sockets")
            .await?
            .map(|text| nim_sockets::parse_nim_sockets(&text))
            .unwrap_or_default())
    }
}

/// Session of a host without a media runtime: nothing plays, records or streams.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdleSession;

#[async_trait]
impl SessionContext for IdleSession {
    async fn stream_clients(&self) -> Result<Vec<StreamClient>> {
        Ok(Vec::new())
    }

    async fn http_streams(&self) -> Result<Vec<HttpStream>> {
        Ok(Vec::new())
    }

    async fn recordings(&self) -> Result<Vec<Option<FrontendInfo>>> {
        Ok(Vec::new())
    }

    async fn record_timers(&self) -> Result<Vec<RecordTimer>> {
        Ok(Vec::new())
    }

    async fn current_service(&self) -> Result<Option<PlayingService>> {
        Ok(None)
    }

    async fn volume(&self) -> Result<VolumeState> {
        Ok(VolumeState::default())
    }

    async fn in_standby(&self) -> Result<bool> {
        Ok(false)
    }

    async fn pip_shown(&self) -> Result<bool> {
        Ok(false)
    }

    async fn service_name(&self, _service_ref: &str) -> Result<Option<String>> {
        Ok(None)
    }

    async fn current_event_name(&self, _service_ref: &str) -> Result<Option<String>> {
        Ok(None)
    }

    async fn alternatives(&self, _service_ref: &str) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_netmask_from_prefix() {
        assert_eq!(netmask(24), [255, 255, 255, 0]);
        assert_eq!(netmask(20), [255, 255, 240, 0]);
        assert_eq!(netmask(32), [255, 255, 255, 255]);
        assert_eq!(netmask(0), [0, 0, 0, 0]);
    }

    #[tokio::test]
    async fn test_missing_files_are_unavailable() {
        let host = LinuxHost::new(AggregatorConfig::new("/nonexistent/boxinfo-root"));
        assert!(matches!(
            host.memory().await,
            Err(SystemError::ProviderUnavailable { provider: "memory", .. })
        ));
        assert_eq!(host.inet6_table().await.unwrap(), None);
        assert!(host.slots().await.unwrap().is_empty());
        assert!(host.mount_tables().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_mount_table_is_skipped() {
        let root = std::env::temp_dir().join(format!("boxinfo-{}", uuid::Uuid::new_v4()));
        // a directory where a map file is expected cannot be read as text
        std::fs::create_dir_all(root.join("etc/auto.network")).unwrap();
        std::fs::write(
            root.join("etc/auto.network_vti"),
            "backup -fstype=nfs,ro nas:/export/backup\n",
        )
        .unwrap();

        let host = LinuxHost::new(AggregatorConfig::new(&root));
        let tables = host.mount_tables().await;
        let _ = std::fs::remove_dir_all(&root);

        let tables = tables.unwrap();
        assert_eq!(tables.len(), 1);
        assert!(tables[0].starts_with("backup"));
    }
}
