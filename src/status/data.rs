//! Data structures for device status snapshots.
//!
//! The serialized key names are consumed verbatim by existing web front ends,
//! so every renamed field below is part of the wire format.

use serde::{Deserialize, Serialize};

/// Sentinel used for textual facts that could not be read.
pub const UNKNOWN: &str = "unknown";

/// A complete capture of device status at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Hardware identity
    #[serde(flatten)]
    pub hardware: HardwareInfo,
    /// Memory figures
    #[serde(flatten)]
    pub memory: MemoryStats,
    /// Uptime text, e.g. "3d 4:05"
    pub uptime: String,
    /// Software versions
    #[serde(flatten)]
    pub versions: VersionInfo,
    /// Tuner slots with optional recording/live annotations
    pub tuners: Vec<TunerInfo>,
    /// Configured network interfaces
    #[serde(rename = "ifaces")]
    pub interfaces: Vec<InterfaceInfo>,
    /// Storage volumes
    #[serde(rename = "hdd")]
    pub volumes: Vec<VolumeInfo>,
    /// Network shares from the autofs maps
    pub shares: Vec<ShareInfo>,
    /// Whether the device can transcode streams
    pub transcoding: bool,
    /// Late-stage failure note; empty when the session block succeeded
    #[serde(rename = "EX")]
    pub error: String,
    /// Connected stream clients, only present when a session was supplied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub streams: Option<Vec<StreamInfo>>,
}

/// Hardware identity of the box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HardwareInfo {
    pub brand: String,
    pub model: String,
    #[serde(rename = "boxtype")]
    pub box_type: String,
    #[serde(rename = "machinebuild")]
    pub machine_build: String,
    /// LCD capability level (0 = none)
    pub lcd: u32,
    /// Whether the box can grab picture-in-picture (0 = no)
    #[serde(rename = "grabpip")]
    pub grab_pip: u32,
    pub chipset: String,
    #[serde(rename = "cpubrand")]
    pub cpu_brand: String,
    #[serde(rename = "cpuarch")]
    pub cpu_arch: String,
    #[serde(rename = "flashtype")]
    pub flash_type: String,
    /// Front processor firmware version, if the box has one
    pub fp_version: Option<u32>,
    #[serde(rename = "friendlychipsetdescription")]
    pub friendly_chipset_description: String,
    #[serde(rename = "friendlychipsettext")]
    pub friendly_chipset_text: String,
}

/// Memory figures rendered the way the front end displays them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryStats {
    /// Total memory, "<n> kB"
    #[serde(rename = "mem1")]
    pub total: String,
    /// Free memory (free + buffers + cache), "<n> kB"
    #[serde(rename = "mem2")]
    pub free: String,
    /// "<free> free / <total> total"
    #[serde(rename = "mem3")]
    pub summary: String,
}

/// Software versions of the image and media stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    #[serde(rename = "webifver")]
    pub webif_version: String,
    #[serde(rename = "imagedistro")]
    pub image_distro: String,
    #[serde(rename = "friendlyimagedistro")]
    pub friendly_image_distro: String,
    #[serde(rename = "oever")]
    pub oe_version: String,
    #[serde(rename = "imagever")]
    pub image_version: String,
    #[serde(rename = "enigmaver")]
    pub runtime_version: String,
    #[serde(rename = "driverdate")]
    pub driver_date: String,
    #[serde(rename = "kernelver")]
    pub kernel_version: String,
    #[serde(rename = "dvbapitype")]
    pub dvb_api: String,
    #[serde(rename = "gstreamerversion")]
    pub gstreamer_version: String,
    #[serde(rename = "ffmpegversion")]
    pub ffmpeg_version: String,
}

/// One tuner slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TunerInfo {
    /// Hardware socket number the session reports as `tuner_number`
    #[serde(skip)]
    pub slot: usize,
    pub name: String,
    /// "<nim name> (<friendly type>)"
    #[serde(rename = "type")]
    pub kind: String,
    /// "<orbital text> / <service>" while recording
    pub rec: String,
    /// "<orbital text> / <service>" while serving live TV
    pub live: String,
}

/// One configured network interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceInfo {
    pub name: String,
    #[serde(rename = "friendlynic")]
    pub friendly_nic: String,
    #[serde(rename = "linkspeed")]
    pub link_speed: String,
    pub mac: String,
    pub dhcp: bool,
    #[serde(rename = "ipv4method")]
    pub ipv4_method: String,
    pub ip: String,
    pub mask: String,
    #[serde(rename = "v4prefix")]
    pub v4_prefix: u32,
    #[serde(rename = "gw")]
    pub gateway: String,
    /// Global IPv6 addresses joined by ", ", or a status text
    pub ipv6: String,
    #[serde(rename = "ipmethod")]
    pub ipv6_method: String,
    #[serde(rename = "firstpublic")]
    pub first_public: Option<String>,
}

/// One storage volume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeInfo {
    pub model: String,
    pub capacity: String,
    pub labelled_capacity: String,
    pub free: String,
    pub mount: Option<String>,
    #[serde(rename = "friendlycapacity")]
    pub friendly_capacity: String,
}

/// One network share.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareInfo {
    pub name: String,
    pub method: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub mode: String,
    pub path: String,
    pub host: String,
    #[serde(rename = "ipaddress")]
    pub ip_address: Option<String>,
    #[serde(rename = "friendlyaddress")]
    pub friendly_address: String,
}

/// One connected stream client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamInfo {
    #[serde(rename = "ref")]
    pub service_ref: String,
    pub name: String,
    pub ip: String,
    /// "S" for a plain stream, "T" for a transcoded one
    #[serde(rename = "type")]
    pub kind: String,
}

/// A value the front end accepts either as a number or as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(i64),
    Text(String),
    /// Reported by the frontend but without a value
    Null,
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Text(String::new())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

/// Signal readings of the tuner feeding the current service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrontendStatus {
    #[serde(rename = "tunertype")]
    pub tuner_type: String,
    #[serde(rename = "tunernumber")]
    pub tuner_number: FieldValue,
    /// Signal quality, 0-100
    pub snr: FieldValue,
    /// Signal quality in dB when available, else the percentage
    pub snr_db: FieldValue,
    /// Signal power, 0-100
    pub agc: FieldValue,
    /// Bit error rate, 0-100
    pub ber: FieldValue,
}

/// Playback status: volume, current service and recording state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusInfo {
    pub volume: u32,
    pub muted: bool,
    pub transcoding: bool,
    pub currservice_filename: String,
    pub currservice_id: i64,
    pub currservice_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currservice_serviceref: Option<String>,
    pub currservice_begin: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currservice_begin_timestamp: Option<i64>,
    pub currservice_end: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currservice_end_timestamp: Option<i64>,
    pub currservice_description: String,
    pub currservice_fulldescription: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currservice_station: Option<String>,
    #[serde(rename = "inStandby", with = "bool_text")]
    pub in_standby: bool,
    #[serde(rename = "isRecording", with = "bool_text")]
    pub is_recording: bool,
    #[serde(
        rename = "Recording_list",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub recording_list: Option<String>,
}

/// Picture-in-picture visibility.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipStatus {
    pub pip: u8,
}

/// Wall clock reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentTime {
    pub status: bool,
    pub time: String,
}

/// Serializes booleans as the strings "true"/"false".
mod bool_text {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(if *value { "true" } else { "false" })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        match String::deserialize(deserializer)?.as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(de::Error::custom(format!("expected \"true\" or \"false\", got {other:?}"))),
        }
    }
}

impl Snapshot {
    /// A snapshot holding only sentinel values.
    pub fn new() -> Self {
        Self {
            hardware: HardwareInfo::default(),
            memory: MemoryStats::default(),
            uptime: "?".to_string(),
            versions: VersionInfo::default(),
            tuners: Vec::new(),
            interfaces: Vec::new(),
            volumes: Vec::new(),
            shares: Vec::new(),
            transcoding: false,
            error: String::new(),
            streams: None,
        }
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStats {
    /// Render memory figures given in kB.
    pub fn from_kb(total_kb: u64, free_kb: u64) -> Self {
        let total = format!("{} kB", total_kb);
        let free = format!("{} kB", free_kb);
        let summary = format!("{} free / {} total", free, total);
        Self {
            total,
            free,
            summary,
        }
    }
}

impl Default for MemoryStats {
    fn default() -> Self {
        Self::from_kb(0, 0)
    }
}

impl Default for HardwareInfo {
    fn default() -> Self {
        Self {
            brand: UNKNOWN.to_string(),
            model: UNKNOWN.to_string(),
            box_type: UNKNOWN.to_string(),
            machine_build: UNKNOWN.to_string(),
            lcd: 0,
            grab_pip: 0,
            chipset: UNKNOWN.to_string(),
            cpu_brand: UNKNOWN.to_string(),
            cpu_arch: UNKNOWN.to_string(),
            flash_type: UNKNOWN.to_string(),
            fp_version: None,
            friendly_chipset_description: "Chipset".to_string(),
            friendly_chipset_text: UNKNOWN.to_string(),
        }
    }
}

impl Default for VersionInfo {
    fn default() -> Self {
        Self {
            webif_version: UNKNOWN.to_string(),
            image_distro: UNKNOWN.to_string(),
            friendly_image_distro: UNKNOWN.to_string(),
            oe_version: UNKNOWN.to_string(),
            image_version: UNKNOWN.to_string(),
            runtime_version: UNKNOWN.to_string(),
            driver_date: UNKNOWN.to_string(),
            kernel_version: UNKNOWN.to_string(),
            dvb_api: UNKNOWN.to_string(),
            gstreamer_version: UNKNOWN.to_string(),
            ffmpeg_version: UNKNOWN.to_string(),
        }
    }
}

impl Default for StatusInfo {
    fn default() -> Self {
        Self {
            volume: 0,
            muted: false,
            transcoding: false,
            currservice_filename: String::new(),
            currservice_id: -1,
            currservice_name: "N/A".to_string(),
            currservice_serviceref: None,
            currservice_begin: String::new(),
            currservice_begin_timestamp: None,
            currservice_end: String::new(),
            currservice_end_timestamp: None,
            currservice_description: String::new(),
            currservice_fulldescription: "N/A".to_string(),
            currservice_station: None,
            in_standby: false,
            is_recording: false,
            recording_list: None,
        }
    }
}
