//! Monitor gauges: label freezing, updates, removal and the `/metrics` endpoint.

mod common;

use axum::http::{HeaderValue, header};
use axum_test::TestServer;
use common::{ADMIN_TOKEN, create_test_resources, exec};
use serde_json::json;
use statuspage_server::api::router;
use statuspage_server::entity::monitor;
use statuspage_server::heartbeat::{CertInfo, Heartbeat, TlsInfo};
use statuspage_server::stats::{MetricsRegistry, MonitorMetrics, MonitorMetricsSet};
use std::sync::Arc;

fn monitor(id: i32, name: &str) -> monitor::Model {
    monitor::Model {
        id,
        name: name.into(),
        monitor_type: "http".into(),
        url: Some(format!("https://{name}.example.org")),
        hostname: None,
        port: Some(443),
        send_url: false,
        active: true,
        basic_auth_user: None,
        basic_auth_pass: None,
    }
}

fn tags(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn first_monitor_fixes_label_set() {
    let registry = MetricsRegistry::new();
    let api = MonitorMetrics::new(&registry, &monitor(1, "api"), &tags(&[("env", "prod"), ("team name", "core")]))
        .expect("metrics");
    let web = MonitorMetrics::new(&registry, &monitor(2, "web"), &tags(&[("region", "eu")]))
        .expect("metrics");

    assert_eq!(
        registry.label_names().unwrap(),
        &[
            "monitor_name",
            "monitor_type",
            "monitor_url",
            "monitor_hostname",
            "monitor_port",
            "env",
            "team_name"
        ]
    );

    api.update(Some(&Heartbeat { status: 1, ping: Some(12.0), ..Default::default() }), None);
    web.update(Some(&Heartbeat { status: 0, ping: None, ..Default::default() }), None);

    let text = registry.encode_text().expect("encode");
    assert!(text.contains(r#"env="prod""#));
    assert!(text.contains(r#"team_name="core""#));
    assert!(text.contains(r#"monitor_name="web""#));
    assert!(!text.contains("region"));
    assert!(text.contains(r#"monitor_port="443""#));
}

#[test]
fn tls_info_sets_certificate_gauges() {
    let registry = MetricsRegistry::new();
    let api = MonitorMetrics::new(&registry, &monitor(1, "api"), &[]).expect("metrics");

    api.update(
        None,
        Some(&TlsInfo {
            valid: true,
            cert_info: Some(CertInfo {
                days_remaining: 30,
                valid_to: None,
            }),
        }),
    );

    let text = registry.encode_text().expect("encode");
    assert!(text.contains("monitor_cert_is_valid{"));
    assert!(text.contains("monitor_cert_days_remaining{"));
    assert!(!text.contains("monitor_status{"));
}

#[test]
fn remove_is_tolerant() {
    let registry = MetricsRegistry::new();
    let set = MonitorMetricsSet::new();
    assert!(!set.remove(99));

    set.record(
        &registry,
        &monitor(1, "api"),
        &[],
        Some(&Heartbeat { status: 1, ..Default::default() }),
        None,
    )
    .expect("record");
    assert_eq!(set.len(), 1);
    assert!(registry.encode_text().unwrap().contains("monitor_status{"));

    assert!(set.remove(1));
    assert!(set.is_empty());
    assert!(!registry.encode_text().unwrap().contains("monitor_status{"));
}

#[test]
fn renamed_monitor_drops_old_series() {
    let registry = MetricsRegistry::new();
    let set = MonitorMetricsSet::new();
    let beat = Heartbeat { status: 1, ..Default::default() };

    set.record(&registry, &monitor(1, "api"), &[], Some(&beat), None).expect("record");
    set.record(&registry, &monitor(1, "gateway"), &[], Some(&beat), None).expect("record");

    let text = registry.encode_text().unwrap();
    assert!(!text.contains(r#"monitor_name="api""#));
    assert!(text.contains(r#"monitor_name="gateway""#));
}

#[tokio::test]
async fn heartbeat_ingest_feeds_metrics_endpoint() {
    let resources = create_test_resources().await;
    exec(&resources.db, "INSERT INTO monitor (id, name, type, url) VALUES (7, 'Checkout', 'http', 'https://shop.example.org')").await;
    let monitors = Arc::clone(&resources.monitor_metrics);
    let server = TestServer::new(router(resources)).expect("create test server");
    let auth = HeaderValue::from_str(&format!("Bearer {ADMIN_TOKEN}")).unwrap();

    server
        .post("/api/admin/monitors/7/heartbeat")
        .add_header(header::AUTHORIZATION, auth.clone())
        .json(&json!({"heartbeat": {"status": 1, "ping": 87}, "tlsInfo": {"valid": true, "certInfo": {"daysRemaining": 12}}}))
        .await
        .assert_status(axum::http::StatusCode::NO_CONTENT);
    assert_eq!(monitors.len(), 1);

    let response = server.get("/metrics").await;
    response.assert_status_ok();
    assert_eq!(
        response.header(header::CONTENT_TYPE),
        "text/plain; version=0.0.4"
    );
    let text = response.text();
    assert!(text.contains(r#"monitor_name="Checkout""#));
    assert!(text.contains("monitor_response_time{"));
    assert!(text.contains("monitor_cert_days_remaining{"));

    server
        .post("/api/admin/monitors/404/heartbeat")
        .add_header(header::AUTHORIZATION, auth.clone())
        .json(&json!({"heartbeat": {"status": 0}}))
        .await
        .assert_status_not_found();

    server
        .delete("/api/admin/monitors/7/metrics")
        .add_header(header::AUTHORIZATION, auth)
        .await
        .assert_json(&json!({"ok": true, "removed": true}));
    assert!(!server.get("/metrics").await.text().contains("Checkout"));
}
