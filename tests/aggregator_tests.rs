use boxinfo::host::mock::{MockHost, MockSession, PROVIDERS};
use boxinfo::status::traits::{
    EpgEvent, FrontendInfo, HttpStream, PlayingService, RecordTimer, SignalReadings,
    StreamClient, TransponderData, TunerSlot, VolumeState,
};
use boxinfo::{
    AggregatorConfig, FieldValue, Providers, Snapshot, SnapshotAggregator, SnapshotCache,
};
use std::sync::Arc;
use std::time::Duration;

fn aggregator_for(host: MockHost) -> (SnapshotAggregator, Arc<MockHost>) {
    let host = Arc::new(host);
    let config = AggregatorConfig::default()
        .with_provider_timeout_ms(200)
        .with_webif_version("OWIF 1.5.0");
    let aggregator = SnapshotAggregator::new(
        Providers::from_host(host.clone()),
        config,
        Arc::new(SnapshotCache::new()),
    );
    (aggregator, host)
}

fn satellite(tuner_number: usize, position: i32) -> FrontendInfo {
    FrontendInfo {
        tuner_type: Some("DVB-S".to_string()),
        tuner_number: Some(tuner_number),
        transponder: Some(TransponderData {
            tuner_type: "DVB-S".to_string(),
            orbital_position: Some(position),
            system: Some(1),
        }),
    }
}

fn playing(name: &str, frontend: FrontendInfo) -> PlayingService {
    PlayingService {
        service_ref: "1:0:19:283D:3FB:1:C00000:0:0:0:".to_string(),
        name: name.to_string(),
        station: Some(name.to_string()),
        frontend: Some(frontend),
        ..PlayingService::default()
    }
}

#[tokio::test]
async fn test_sample_snapshot() {
    let (aggregator, _) = aggregator_for(MockHost::sample());
    let snapshot = aggregator.snapshot(None, true).await;

    assert_eq!(snapshot.hardware.friendly_chipset_text, "bcm7376 (2)");
    assert_eq!(snapshot.memory.total, "1956304 kB");
    assert_eq!(snapshot.uptime, "3d 4:05");
    assert_eq!(snapshot.versions.webif_version, "OWIF 1.5.0");
    assert_eq!(snapshot.error, "");
    assert!(snapshot.streams.is_none());

    assert_eq!(snapshot.tuners.len(), 2);
    assert_eq!(snapshot.tuners[0].kind, "BCM45208 (DVB-S2)");
    assert_eq!(snapshot.tuners[1].name, "Tuner B");

    let eth0 = &snapshot.interfaces[0];
    assert_eq!(eth0.friendly_nic, "Broadcom Gigabit Ethernet");
    assert_eq!(eth0.link_speed, "1 GBit/s");
    assert_eq!(eth0.ipv4_method, "DHCP");
    assert_eq!(eth0.ip, "192.168.1.20");
    assert_eq!(eth0.v4_prefix, 24);
    assert_eq!(eth0.gateway, "192.168.1.1");
    assert_eq!(eth0.ipv6, "2001:db8::1/64");
    assert_eq!(eth0.ipv6_method, "SLAAC");
    assert_eq!(eth0.first_public.as_deref(), Some("2001:db8::1"));

    let hdd = &snapshot.volumes[0];
    assert_eq!(hdd.free, "512.0 GB");
    assert_eq!(hdd.labelled_capacity, "1 TB");

    assert_eq!(snapshot.shares.len(), 2);
    let movies = &snapshot.shares[0];
    assert_eq!(movies.kind, "SMBv3.0");
    assert_eq!(movies.method, "autofs");
    assert_eq!(movies.ip_address.as_deref(), Some("192.168.1.5"));
    assert_eq!(movies.friendly_address, "nas (192.168.1.5)");
    let backup = &snapshot.shares[1];
    assert_eq!(backup.kind, "NFS");
    assert_eq!(backup.mode, "r/o");
}

#[tokio::test]
async fn test_every_provider_failing_still_yields_complete_snapshot() {
    let host = PROVIDERS
        .iter()
        .fold(MockHost::sample(), |host, provider| host.failing(*provider));
    let (aggregator, _) = aggregator_for(host);
    let snapshot = aggregator.snapshot(None, true).await;

    let mut expected = Snapshot::new();
    expected.versions.webif_version = "OWIF 1.5.0".to_string();
    assert_eq!(*snapshot, expected);

    let json = serde_json::to_value(&*snapshot).unwrap();
    for key in ["brand", "mem1", "mem3", "uptime", "webifver", "tuners", "ifaces", "hdd", "shares", "EX"] {
        assert!(json.get(key).is_some(), "missing key {}", key);
    }
    assert_eq!(json["uptime"], "?");
}

#[tokio::test]
async fn test_per_interface_failures_use_sentinels() {
    let host = MockHost::sample()
        .failing("link speed")
        .failing("nic driver")
        .failing("ipv6 table")
        .failing("resolver");
    let (aggregator, _) = aggregator_for(host);
    let snapshot = aggregator.snapshot(None, true).await;

    let eth0 = &snapshot.interfaces[0];
    assert_eq!(eth0.link_speed, "unknown MBit/s");
    assert_eq!(eth0.friendly_nic, "unknown");
    assert_eq!(eth0.ipv6, "IPv4-only kernel");
    assert_eq!(eth0.first_public, None);

    let movies = &snapshot.shares[0];
    assert_eq!(movies.ip_address, None);
    assert_eq!(movies.friendly_address, "nas");
}

#[tokio::test]
async fn test_cached_snapshot_is_reused() {
    let (aggregator, host) = aggregator_for(MockHost::sample());

    let first = aggregator.snapshot(None, false).await;
    let calls = host.calls();
    let second = aggregator.snapshot(None, false).await;

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(host.calls(), calls);
}

#[tokio::test]
async fn test_force_full_repolls() {
    let (aggregator, host) = aggregator_for(MockHost::sample());

    let first = aggregator.snapshot(None, true).await;
    let calls = host.calls();
    let second = aggregator.snapshot(None, true).await;

    assert!(!Arc::ptr_eq(&first, &second));
    assert!(host.calls() > calls);
    let cached = aggregator.cache().get().await.unwrap();
    assert!(Arc::ptr_eq(&cached, &second));
}

#[tokio::test]
async fn test_slow_provider_yields_sentinel() {
    let host = MockHost::sample().slow("memory", Duration::from_secs(5));
    let (aggregator, _) = aggregator_for(host);

    let snapshot = tokio::time::timeout(Duration::from_secs(2), aggregator.snapshot(None, true))
        .await
        .expect("provider timeout must bound the snapshot");

    assert_eq!(snapshot.memory.total, "0 kB");
    assert_eq!(snapshot.memory.summary, "0 kB free / 0 kB total");
    assert_eq!(snapshot.uptime, "3d 4:05");
}

#[tokio::test]
async fn test_session_annotates_tuners_and_streams() {
    let (aggregator, _) = aggregator_for(MockHost::sample());
    let session = MockSession {
        stream_clients: vec![
            StreamClient {
                ip: "192.168.1.30".to_string(),
                service_ref: "1:0:19:283D:3FB:1:C00000:0:0:0:".to_string(),
                service_name: Some("Das Erste HD".to_string()),
                transcoding: false,
            },
            StreamClient {
                ip: "192.168.1.31".to_string(),
                service_ref: "1:0:19:2B66:3F3:1:C00000:0:0:0:".to_string(),
                service_name: None,
                transcoding: true,
            },
        ],
        recordings: vec![Some(satellite(0, 192)), None],
        record_timers: vec![
            RecordTimer {
                service_name: "\u{86}ZDF HD\u{87}".to_string(),
                name: "heute".to_string(),
                running: true,
                justplay: false,
            },
            RecordTimer {
                service_name: "arte HD".to_string(),
                name: "zap".to_string(),
                running: true,
                justplay: true,
            },
        ],
        current_service: Some(playing("Das Erste HD", satellite(1, 2700))),
        ..MockSession::default()
    };

    let snapshot = aggregator.snapshot(Some(&session), true).await;

    assert_eq!(snapshot.error, "");
    assert_eq!(snapshot.tuners[0].rec, "19.2° E / ZDF HD");
    assert_eq!(snapshot.tuners[1].live, "90.0° W / Das Erste HD");
    assert_eq!(snapshot.tuners[0].live, "");

    let streams = snapshot.streams.as_ref().unwrap();
    assert_eq!(streams.len(), 2);
    assert_eq!(streams[0].kind, "S");
    assert_eq!(streams[0].name, "Das Erste HD");
    assert_eq!(streams[1].kind, "T");
    assert_eq!(streams[1].name, "(unknown service)");
}

#[tokio::test]
async fn test_recording_falls_back_to_single_http_stream() {
    let (aggregator, _) = aggregator_for(MockHost::sample());
    let session = MockSession {
        recordings: vec![Some(satellite(1, 130))],
        http_streams: vec![HttpStream {
            service_ref: "1:0:19:283D:3FB:1:C00000:0:0:0:".to_string(),
            client_ip: "10.0.0.9".to_string(),
            channel_name: Some("Das Erste HD".to_string()),
        }],
        ..MockSession::default()
    };

    let snapshot = aggregator.snapshot(Some(&session), true).await;
    assert_eq!(snapshot.tuners[1].rec, "13.0° E / Das Erste HD (10.0.0.9)");
}

#[tokio::test]
async fn test_session_failure_populates_error_slot() {
    let (aggregator, _) = aggregator_for(MockHost::sample());
    let session = MockSession {
        recordings: vec![Some(satellite(0, 192)), Some(satellite(7, 130))],
        record_timers: vec![RecordTimer {
            service_name: "ZDF HD".to_string(),
            name: "heute".to_string(),
            running: true,
            justplay: false,
        }],
        ..MockSession::default()
    };

    let snapshot = aggregator.snapshot(Some(&session), true).await;

    assert!(snapshot.error.contains("tuner 7 out of range"), "{}", snapshot.error);
    // annotations made before the failure survive
    assert_eq!(snapshot.tuners[0].rec, "19.2° E / ZDF HD");
    assert_eq!(snapshot.memory.total, "1956304 kB");
    assert_eq!(snapshot.interfaces.len(), 1);
}

#[tokio::test]
async fn test_stream_client_failure_is_not_an_error() {
    let (aggregator, _) = aggregator_for(MockHost::sample());
    let session = MockSession::default().failing("stream clients");

    let snapshot = aggregator.snapshot(Some(&session), true).await;
    assert_eq!(snapshot.streams.as_deref(), Some(&[][..]));
    assert_eq!(snapshot.error, "");
}

#[tokio::test]
async fn test_frontend_status() {
    let (aggregator, _) = aggregator_for(MockHost::sample());

    let idle = aggregator.frontend_status(&MockSession::default()).await;
    assert_eq!(idle.tuner_type, "");
    assert_eq!(idle.snr, FieldValue::Text(String::new()));

    let mut service = playing("Das Erste HD", satellite(1, 192));
    service.signal = Some(SignalReadings {
        signal_quality: Some(52_428),
        signal_quality_db: Some(1_234),
        signal_power: Some(65_535),
        bit_error_rate: Some(0),
    });
    let session = MockSession {
        current_service: Some(service),
        ..MockSession::default()
    };
    let status = aggregator.frontend_status(&session).await;

    assert_eq!(status.tuner_type, "DVB-S");
    assert_eq!(status.tuner_number, FieldValue::Number(1));
    assert_eq!(status.snr, FieldValue::Number(80));
    assert_eq!(status.snr_db, FieldValue::Text("12.34".to_string()));
    assert_eq!(status.agc, FieldValue::Number(100));
    assert_eq!(status.ber, FieldValue::Number(0));
}

#[tokio::test]
async fn test_frontend_status_without_tuner_number() {
    let (aggregator, _) = aggregator_for(MockHost::sample());
    let frontend = FrontendInfo {
        tuner_number: None,
        ..satellite(0, 192)
    };
    let session = MockSession {
        current_service: Some(playing("Das Erste HD", frontend)),
        ..MockSession::default()
    };

    let status = aggregator.frontend_status(&session).await;
    assert_eq!(status.tuner_type, "DVB-S");
    assert_eq!(status.tuner_number, FieldValue::Null);
    let json = serde_json::to_value(&status).unwrap();
    assert!(json["tunernumber"].is_null());
}

#[tokio::test]
async fn test_tuners_keep_socket_numbers_across_gaps() {
    let mut host = MockHost::sample();
    host.tuners = vec![
        TunerSlot {
            slot: 0,
            slot_name: "Tuner A".to_string(),
            nim_name: "BCM45208".to_string(),
            friendly_type: "DVB-S2".to_string(),
        },
        TunerSlot {
            slot: 2,
            slot_name: "Tuner C".to_string(),
            nim_name: "Si2169C".to_string(),
            friendly_type: "DVB-T2".to_string(),
        },
    ];
    let (aggregator, _) = aggregator_for(host);
    let session = MockSession {
        current_service: Some(playing("Das Erste HD", satellite(2, 192))),
        ..MockSession::default()
    };

    let snapshot = aggregator.snapshot(Some(&session), true).await;
    assert_eq!(snapshot.error, "");
    assert_eq!(snapshot.tuners[1].slot, 2);
    assert_eq!(snapshot.tuners[1].live, "19.2° E / Das Erste HD");
    assert_eq!(snapshot.tuners[0].live, "");
}

#[tokio::test]
async fn test_concurrent_forced_refreshes() {
    let (aggregator, _) = aggregator_for(MockHost::sample());

    let (first, second) = tokio::join!(
        aggregator.snapshot(None, true),
        aggregator.snapshot(None, true)
    );
    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(first.hardware, second.hardware);

    let cached = aggregator.cache().get().await.expect("a refresh should be cached");
    assert!(Arc::ptr_eq(&cached, &first) || Arc::ptr_eq(&cached, &second));
    let again = aggregator.snapshot(None, false).await;
    assert!(Arc::ptr_eq(&again, &cached));
}

#[tokio::test]
async fn test_status_info_with_event() {
    let host = Arc::new(MockHost::sample());
    let config = AggregatorConfig::default().with_margins(5, 10).with_transcoding(true);
    let aggregator = SnapshotAggregator::new(
        Providers::from_host(host),
        config,
        Arc::new(SnapshotCache::new()),
    );

    let mut service = playing("Das Erste HD", satellite(0, 192));
    service.event = Some(EpgEvent {
        id: 4711,
        begin: 1_700_000_000,
        end: 1_700_003_600,
        name: "\u{86}Tagesschau\u{87}".to_string(),
        description: "x".repeat(300),
        extended_description: "Line one\u{8a}Line two".to_string(),
    });
    let session = MockSession {
        current_service: Some(service),
        volume: VolumeState {
            volume: 42,
            muted: true,
        },
        in_standby: true,
        recordings: vec![Some(satellite(0, 192))],
        record_timers: vec![RecordTimer {
            service_name: "ZDF HD".to_string(),
            name: "heute".to_string(),
            running: true,
            justplay: false,
        }],
        ..MockSession::default()
    };

    let status = aggregator.status_info(&session).await;

    assert_eq!(status.volume, 42);
    assert!(status.muted);
    assert!(status.transcoding);
    assert!(status.in_standby);
    assert_eq!(status.currservice_id, 4711);
    assert_eq!(status.currservice_name, "Tagesschau");
    assert_eq!(status.currservice_begin_timestamp, Some(1_700_000_300));
    assert_eq!(status.currservice_end_timestamp, Some(1_700_003_000));
    assert_eq!(status.currservice_description.chars().count(), 223);
    assert!(status.currservice_description.ends_with("..."));
    assert!(status
        .currservice_fulldescription
        .starts_with("Tagesschau\n"));
    assert!(status
        .currservice_fulldescription
        .ends_with("\n\nLine one\nLine two"));
    assert_eq!(status.currservice_station.as_deref(), Some("Das Erste HD"));
    assert!(status.is_recording);
    assert_eq!(status.recording_list.as_deref(), Some("\nZDF HD: heute\n"));

    let json = serde_json::to_value(&status).unwrap();
    assert_eq!(json["inStandby"], "true");
    assert_eq!(json["isRecording"], "true");
}

#[tokio::test]
async fn test_status_info_without_event() {
    let (aggregator, _) = aggregator_for(MockHost::sample());
    let session = MockSession {
        current_service: Some(PlayingService {
            service_ref: "4097:0:1:0:0:0:0:0:0:0:http%3a//tv.example/live.m3u8".to_string(),
            name: "IPTV".to_string(),
            ..PlayingService::default()
        }),
        recordings: vec![None],
        ..MockSession::default()
    };

    let status = aggregator.status_info(&session).await;

    assert_eq!(status.currservice_name, "N/A");
    assert_eq!(status.currservice_fulldescription, "N/A");
    assert_eq!(status.currservice_id, -1);
    assert_eq!(status.currservice_filename, "");
    assert_eq!(
        status.currservice_station.as_deref(),
        Some("http://tv.example/live.m3u8")
    );
    // recordings without running record timers do not count
    assert!(!status.is_recording);
    assert_eq!(status.recording_list.as_deref(), Some("\n"));
}

#[tokio::test]
async fn test_status_info_session_failures() {
    let (aggregator, _) = aggregator_for(MockHost::sample());
    let session = MockSession {
        volume: VolumeState {
            volume: 80,
            muted: false,
        },
        ..MockSession::default()
    }
    .failing("volume")
    .failing("standby");

    let status = aggregator.status_info(&session).await;
    assert_eq!(status.volume, 0);
    assert!(!status.in_standby);
    assert_eq!(status.currservice_serviceref, None);
    assert_eq!(status.recording_list, None);
}

#[tokio::test]
async fn test_pip_status() {
    let (aggregator, _) = aggregator_for(MockHost::sample());
    let shown = MockSession {
        pip_shown: true,
        ..MockSession::default()
    };
    assert_eq!(aggregator.pip_status(&shown).await.pip, 1);
    assert_eq!(aggregator.pip_status(&MockSession::default()).await.pip, 0);

    let mut host = MockHost::sample();
    host.hardware.grab_pip = 0;
    let (aggregator, _) = aggregator_for(host);
    assert_eq!(aggregator.pip_status(&shown).await.pip, 0);
}

#[tokio::test]
async fn test_stream_names_and_alternatives() {
    let (aggregator, _) = aggregator_for(MockHost::sample());
    let group = "1:134:1:0:0:0:0:0:0:0:FROM BOUQUET \"alternatives.ard.tv\"";
    let mut session = MockSession::default();
    session
        .service_names
        .insert("1:0:19:283D:3FB:1:C00000:0:0:0:".to_string(), "\u{86}Das Erste HD\u{87}".to_string());
    session
        .event_names
        .insert("1:0:19:283D:3FB:1:C00000:0:0:0:".to_string(), "Tagesschau".to_string());
    session.alternatives.insert(
        group.to_string(),
        vec![
            "1:0:19:283D:3FB:1:C00000:0:0:0:".to_string(),
            "1:0:1:283D:3FB:1:C00000:0:0:0:".to_string(),
        ],
    );

    let plain = "1:0:19:283D:3FB:1:C00000:0:0:0:";
    assert_eq!(aggregator.stream_service_name(&session, plain).await, "Das Erste HD");
    assert_eq!(aggregator.stream_event_name(&session, plain).await, "Tagesschau");
    assert_eq!(aggregator.stream_service_name(&session, "1:0:1:0:0:0:0:0:0:0:").await, "");

    assert_eq!(aggregator.first_alternative(&session, group).await, plain);
    assert_eq!(aggregator.alternatives(&session, group).await.len(), 2);
    assert_eq!(aggregator.first_alternative(&session, plain).await, plain);
    assert!(aggregator.alternatives(&session, plain).await.is_empty());
}
