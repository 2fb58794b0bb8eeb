//! End-to-end tests of the scrape pipeline against a local mock of the
//! Fireboard API.

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use tokio::sync::watch;

use fireboard_core::device::{ChannelRecord, DeviceLog};
use fireboard_core::{
    ClientConfig, Credential, DeviceRecord, Labels, MapperConfig, Metric, Observation,
    ScrapeError, Scraper, decode,
};

const DEVICES_PATH: &str = "/api/v1/devices.json";

/// Serve a fixed status and body on the devices path.
async fn spawn_upstream(status: StatusCode, body: String) -> SocketAddr {
    let router = Router::new().route(
        DEVICES_PATH,
        get(move || {
            let body = body.clone();
            async move { (status, body) }
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

fn scraper_for(addr: SocketAddr) -> Scraper {
    let config = ClientConfig {
        endpoint: format!("http://{}{}", addr, DEVICES_PATH),
        token: Credential::new("test-token"),
        timeout_secs: 2,
        ..Default::default()
    };
    Scraper::from_config(&config, MapperConfig::default()).unwrap()
}

fn live_record() -> DeviceRecord {
    DeviceRecord {
        title: "Smoker".to_string(),
        latest_temps: vec![serde_json::json!({"temp": 72.5, "channel": 1})],
        device_log: DeviceLog {
            v_batt: 4.05,
            txpower: 78.0,
            signallevel: -55.0,
            nightmode: true,
            cpu_usage: "17%".to_string(),
            ..Default::default()
        },
        channels: vec![
            ChannelRecord {
                channel_label: "Pit".to_string(),
                enabled: true,
                current_temp: 72.5,
                ..Default::default()
            },
            ChannelRecord {
                channel_label: "Meat".to_string(),
                enabled: false,
                current_temp: 30.0,
                ..Default::default()
            },
        ],
        ..Default::default()
    }
}

#[tokio::test]
async fn test_single_live_device() {
    let body = serde_json::to_string(&vec![live_record()]).unwrap();
    let addr = spawn_upstream(StatusCode::OK, body).await;

    let output = scraper_for(addr).scrape().await.unwrap();

    let device = || Labels::device("Smoker");
    assert_eq!(output.devices, vec!["Smoker".to_string()]);
    assert_eq!(
        output.mapped.observations,
        vec![
            Observation::new(Metric::Up, device(), 1.0),
            Observation::new(Metric::BatteryVolts, device(), 4.05),
            Observation::new(Metric::TransmitPower, device(), 78.0),
            Observation::new(Metric::SignalLevel, device(), -55.0),
            Observation::new(Metric::NightMode, device(), 1.0),
            Observation::new(Metric::CpuUsage, device(), 17.0),
            Observation::new(Metric::ProbeTemperature, Labels::channel("Smoker", 1), 72.5),
        ]
    );
    assert!(output.mapped.errors.is_empty());
}

#[tokio::test]
async fn test_device_without_latest_temps_is_down() {
    let mut record = live_record();
    record.latest_temps.clear();
    let body = serde_json::to_string(&vec![record]).unwrap();
    let addr = spawn_upstream(StatusCode::OK, body).await;

    let output = scraper_for(addr).scrape().await.unwrap();

    assert_eq!(
        output.mapped.observations,
        vec![Observation::new(Metric::Up, Labels::device("Smoker"), 0.0)]
    );
}

#[tokio::test]
async fn test_empty_device_list_is_success() {
    let addr = spawn_upstream(StatusCode::OK, "[]".to_string()).await;

    let output = scraper_for(addr).scrape().await.unwrap();

    assert!(output.devices.is_empty());
    assert!(output.mapped.observations.is_empty());
}

#[tokio::test]
async fn test_malformed_payload_fails_scrape() {
    let addr = spawn_upstream(StatusCode::OK, r#"{"error": "oops"}"#.to_string()).await;

    let err = scraper_for(addr).scrape().await.unwrap_err();
    assert!(matches!(err, ScrapeError::Decode(_)));
}

#[tokio::test]
async fn test_mistyped_unused_fields_do_not_fail_scrape() {
    let mut device = serde_json::to_value(live_record()).unwrap();
    device["id"] = serde_json::json!("abc");
    device["device_log"]["onboardTemp"] = serde_json::json!("31.5");
    device["device_log"]["version"] = serde_json::json!(2);
    device["latest_temps"][0]["created"] = serde_json::json!(1714564800);
    let body = serde_json::to_string(&vec![device]).unwrap();
    let addr = spawn_upstream(StatusCode::OK, body).await;

    let output = scraper_for(addr).scrape().await.unwrap();

    assert_eq!(output.devices, vec!["Smoker".to_string()]);
    assert_eq!(output.mapped.observations.len(), 7);
    assert!(output.mapped.errors.is_empty());
}

#[tokio::test]
async fn test_upstream_error_status_fails_scrape() {
    let addr = spawn_upstream(StatusCode::INTERNAL_SERVER_ERROR, "[]".to_string()).await;

    let err = scraper_for(addr).scrape().await.unwrap_err();
    assert!(matches!(err, ScrapeError::Fetch(_)));
}

#[tokio::test]
async fn test_bad_cpu_does_not_fail_scrape() {
    let mut record = live_record();
    record.device_log.cpu_usage = "n/a".to_string();
    let body = serde_json::to_string(&vec![record]).unwrap();
    let addr = spawn_upstream(StatusCode::OK, body).await;

    let output = scraper_for(addr).scrape().await.unwrap();

    assert_eq!(output.mapped.errors.len(), 1);
    assert!(
        output
            .mapped
            .observations
            .iter()
            .all(|o| o.metric != Metric::CpuUsage)
    );
    assert!(
        output
            .mapped
            .observations
            .iter()
            .any(|o| o.metric == Metric::ProbeTemperature)
    );
}

#[tokio::test]
async fn test_concurrent_scrapes_are_independent() {
    let body = serde_json::to_string(&vec![live_record()]).unwrap();
    let addr = spawn_upstream(StatusCode::OK, body).await;
    let scraper = scraper_for(addr);

    let (a, b) = tokio::join!(scraper.scrape(), scraper.scrape());
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_eq!(a.mapped, b.mapped);
}

#[tokio::test]
async fn test_scrape_cancelled_by_shutdown() {
    let router = Router::new().route(
        DEVICES_PATH,
        get(|| async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            "[]"
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    let config = ClientConfig {
        endpoint: format!("http://{}{}", addr, DEVICES_PATH),
        timeout_secs: 30,
        ..Default::default()
    };
    let scraper = Scraper::from_config(&config, MapperConfig::default()).unwrap();
    let (tx, rx) = watch::channel(false);

    let handle = tokio::spawn(async move { scraper.scrape_until(rx).await });
    tokio::time::sleep(Duration::from_millis(100)).await;
    tx.send(true).unwrap();

    let result = tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("scrape should stop promptly")
        .unwrap();
    assert!(matches!(result, Err(ScrapeError::Cancelled)));
}

#[tokio::test]
async fn test_scrape_until_without_shutdown_completes() {
    let addr = spawn_upstream(StatusCode::OK, "[]".to_string()).await;
    let (_tx, rx) = watch::channel(false);

    assert!(scraper_for(addr).scrape_until(rx).await.is_ok());
}

#[test]
fn test_fixture_round_trip_preserves_mapped_fields() {
    let records = vec![live_record()];
    let encoded = serde_json::to_vec(&records).unwrap();

    let snapshots = decode(&encoded).unwrap();
    let direct = live_record().into_snapshot(1);

    assert_eq!(snapshots, vec![direct]);
}
