//! Stateless queries against the live session.
//!
//! None of these are cached; each call asks the session again. Session
//! failures resolve to the same empty/default values a box without a running
//! service would report.

use crate::status::aggregator::SnapshotAggregator;
use crate::status::data::{CurrentTime, FieldValue, FrontendStatus, PipStatus, StatusInfo};
use crate::status::format;
use crate::status::traits::{PlayingService, SessionContext, VolumeState};
use chrono::{Local, TimeZone, Timelike};

/// Characters of event description shown before it is cut.
const DESCRIPTION_LIMIT: usize = 220;

/// Service reference prefix of an alternative service group.
const ALTERNATIVES_PREFIX: &str = "1:134:";

impl SnapshotAggregator {
    /// Signal readings of the tuner feeding the current service.
    pub async fn frontend_status(&self, session: &dyn SessionContext) -> FrontendStatus {
        let mut status = FrontendStatus::default();
        let Some(service) = self
            .settle("current service", session.current_service())
            .await
            .flatten()
        else {
            return status;
        };

        if let Some(frontend) = &service.frontend {
            status.tuner_type = frontend
                .tuner_type
                .clone()
                .unwrap_or_else(|| "UNKNOWN".to_string());
            status.tuner_number = match frontend.tuner_number {
                Some(number) => FieldValue::Number(number as i64),
                None => FieldValue::Null,
            };
        }

        if let Some(signal) = &service.signal {
            if let Some(quality) = signal.signal_quality {
                status.snr = format::signal_percent(quality).into();
                status.snr_db = status.snr.clone();
            }
            if let Some(centi_db) = signal.signal_quality_db {
                status.snr_db = format::signal_db(centi_db).into();
            }
            if let Some(power) = signal.signal_power {
                status.agc = format::signal_percent(power).into();
            }
            if let Some(ber) = signal.bit_error_rate {
                status.ber = format::signal_percent(ber).into();
            }
        }
        status
    }

    /// Volume, current service with its running event, standby and recording state.
    pub async fn status_info(&self, session: &dyn SessionContext) -> StatusInfo {
        let (volume, playing, in_standby, recording_list) = tokio::join!(
            self.settle("volume", session.volume()),
            self.settle("current service", session.current_service()),
            self.settle("standby", session.in_standby()),
            self.recording_list(session),
        );
        let VolumeState { volume, muted } = volume.unwrap_or_default();

        let mut status = StatusInfo {
            volume,
            muted,
            transcoding: self.config().transcoding,
            in_standby: in_standby.unwrap_or(false),
            is_recording: recording_list.as_deref().is_some_and(|list| list != "\n"),
            recording_list,
            ..StatusInfo::default()
        };
        if let Some(service) = playing.flatten() {
            self.describe_playing(&service, &mut status).await;
        }
        status
    }

    async fn describe_playing(&self, service: &PlayingService, status: &mut StatusInfo) {
        let service_ref = &service.service_ref;
        status.currservice_serviceref = Some(service_ref.clone());
        let station = service
            .station
            .as_deref()
            .map(format::clean_epg_text);

        match &service.event {
            Some(event) => {
                let config = self.config();
                let begin = event.begin + config.margin_before_min * 60;
                let end = event.end - config.margin_after_min * 60;

                status.currservice_name = format::clean_epg_text(&event.name);
                status.currservice_begin = local_clock(begin);
                status.currservice_begin_timestamp = Some(begin);
                status.currservice_end = local_clock(end);
                status.currservice_end_timestamp = Some(end);
                status.currservice_description =
                    format::truncate_description(&event.description, DESCRIPTION_LIMIT);
                status.currservice_station = station;
                if service_ref.starts_with("1:0:0") {
                    status.currservice_filename = recording_path(service_ref);
                }
                status.currservice_fulldescription = format!(
                    "{}\n{} - {}\n\n{}",
                    status.currservice_name,
                    status.currservice_begin,
                    status.currservice_end,
                    format::clean_epg_text(&event.extended_description)
                );
                status.currservice_id = event.id;
            }
            None => {
                if service_ref.starts_with("1:0:0") || service_ref.starts_with("4097:0:0") {
                    let path = recording_path(service_ref);
                    if self.host_file_exists(&path).await {
                        status.currservice_filename = path;
                    }
                }
                status.currservice_station = Some(match station {
                    Some(station) => station,
                    None => stream_url(service_ref).unwrap_or_else(|| "N/A".to_string()),
                });
            }
        }
    }

    async fn host_file_exists(&self, path: &str) -> bool {
        let local = self.config().host_path(path.trim_start_matches('/'));
        tokio::fs::metadata(&local).await.is_ok()
    }

    /// "\n" followed by "<service>: <timer>\n" per running record timer,
    /// `None` when nothing records.
    async fn recording_list(&self, session: &dyn SessionContext) -> Option<String> {
        let recordings = self
            .settle("recordings", session.recordings())
            .await
            .unwrap_or_default();
        if recordings.is_empty() {
            return None;
        }

        let timers = self
            .settle("record timers", session.record_timers())
            .await
            .unwrap_or_default();
        let mut list = String::from("\n");
        for timer in timers.iter().filter(|t| t.running && !t.justplay) {
            list.push_str(&format!(
                "{}: {}\n",
                format::clean_epg_text(&timer.service_name),
                timer.name
            ));
        }
        Some(list)
    }

    /// 1 when the box can grab PiP and a PiP window is shown.
    pub async fn pip_status(&self, session: &dyn SessionContext) -> PipStatus {
        let snapshot = self.snapshot(None, false).await;
        if snapshot.hardware.grab_pip == 0 {
            return PipStatus { pip: 0 };
        }
        let shown = self
            .settle("pip", session.pip_shown())
            .await
            .unwrap_or(false);
        PipStatus { pip: u8::from(shown) }
    }

    /// Name of a streamed service, "" when unknown.
    pub async fn stream_service_name(&self, session: &dyn SessionContext, service_ref: &str) -> String {
        self.settle("service name", session.service_name(service_ref))
            .await
            .flatten()
            .map(|name| format::clean_epg_text(&name))
            .unwrap_or_default()
    }

    /// Name of the event running on a streamed service, "" when unknown.
    pub async fn stream_event_name(&self, session: &dyn SessionContext, service_ref: &str) -> String {
        self.settle("event name", session.current_event_name(service_ref))
            .await
            .flatten()
            .unwrap_or_default()
    }

    /// Members of an alternative group; empty for plain services.
    pub async fn alternatives(&self, session: &dyn SessionContext, service_ref: &str) -> Vec<String> {
        if !service_ref.starts_with(ALTERNATIVES_PREFIX) {
            return Vec::new();
        }
        self.settle("alternatives", session.alternatives(service_ref))
            .await
            .unwrap_or_default()
    }

    /// First member of an alternative group, or the reference itself.
    pub async fn first_alternative(&self, session: &dyn SessionContext, service_ref: &str) -> String {
        self.alternatives(session, service_ref)
            .await
            .into_iter()
            .next()
            .unwrap_or_else(|| service_ref.to_string())
    }
}

/// The local wall clock.
pub fn current_time() -> CurrentTime {
    let now = Local::now();
    CurrentTime {
        status: true,
        time: format!("{:2}:{:02}:{:02}", now.hour(), now.minute(), now.second()),
    }
}

/// "HH:MM" in local time; "" for timestamps chrono cannot place.
fn local_clock(timestamp: i64) -> String {
    Local
        .timestamp_opt(timestamp, 0)
        .single()
        .map(|t| t.format("%H:%M").to_string())
        .unwrap_or_default()
}

/// Path of a file-backed service: everything after the first '/'.
fn recording_path(service_ref: &str) -> String {
    let mut path = String::new();
    for part in service_ref.split('/').skip(1) {
        path.push('/');
        path.push_str(part);
    }
    if path.is_empty() {
        path.push('/');
    }
    path
}

/// The URL tail of an IPTV reference.
fn stream_url(service_ref: &str) -> Option<String> {
    let decoded = service_ref.replace("%3a", ":");
    decoded.find("http").map(|start| decoded[start..].to_string())
}
