//! Integration tests for what reaches the collector
//!
//! Verifies the gzip body, the request headers, fragment aggregation from
//! every registered plugin, the player clamp, and that an unloaded plugin
//! or an unreachable collector never breaks a cycle.

use plugmetrics_core::domain::ReporterState;
use plugmetrics_core::ports::HostEnvironment;
use plugmetrics_telemetry::decompress;
use serde_json::Value;
use wiremock::MockServer;

use crate::common::{self, Harness};

/// Decodes every body the collector received.
async fn received_snapshots(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .expect("request recording enabled")
        .iter()
        .map(|request| {
            let json = decompress(&request.body).expect("gzip body");
            serde_json::from_str(&json).expect("json body")
        })
        .collect()
}

#[tokio::test]
async fn test_leader_tick_submits_every_plugin() {
    let plugins = tempfile::tempdir().unwrap();
    let server = common::setup_collector().await;
    let harness = Harness::new(common::collector_endpoint(&server));

    let alpha = harness.start(common::plugin("Alpha", "1.0.0", plugins.path()));
    let beta = harness.start(common::plugin("Beta", "2.3.1", plugins.path()));
    assert_eq!(alpha.state(), ReporterState::Submitting);
    assert_eq!(beta.state(), ReporterState::Follower);

    harness.scheduler.tick().await;

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.url.path(), common::SUBMIT_PATH);
    let header = |name: &str| {
        request
            .headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    assert_eq!(header("content-encoding").as_deref(), Some("gzip"));
    assert_eq!(header("content-type").as_deref(), Some("application/json"));
    assert_eq!(header("accept").as_deref(), Some("application/json"));
    assert_eq!(header("user-agent").as_deref(), Some("MC-Server/1"));
    assert_eq!(
        header("content-length"),
        Some(request.body.len().to_string())
    );

    let snapshot = &received_snapshots(&server).await[0];
    assert_eq!(
        snapshot["serverUUID"].as_str().unwrap(),
        alpha.config().unwrap().server_uuid.to_string()
    );
    assert_eq!(snapshot["playerAmount"], 42);
    assert_eq!(snapshot["managedServers"], 3);
    assert_eq!(snapshot["onlineMode"], 1);
    assert_eq!(snapshot["bungeecordVersion"], "proxy-1.20");
    assert_eq!(snapshot["javaVersion"], "17.0.8");
    assert!(snapshot["osName"].is_string());
    assert!(snapshot["coreCount"].as_u64().unwrap() >= 1);

    let plugins = snapshot["plugins"].as_array().unwrap();
    assert_eq!(plugins.len(), 2);
    assert_eq!(plugins[0]["pluginName"], "Alpha");
    assert_eq!(plugins[0]["pluginVersion"], "1.0.0");
    assert_eq!(plugins[1]["pluginName"], "Beta");
    assert_eq!(plugins[1]["pluginVersion"], "2.3.1");
    assert_eq!(plugins[1]["customCharts"], serde_json::json!([]));

    assert_eq!(alpha.metrics().unwrap().submissions(true), 1);
}

#[tokio::test]
async fn test_unloaded_plugin_is_left_out() {
    let plugins = tempfile::tempdir().unwrap();
    let server = common::setup_collector().await;
    let harness = Harness::new(common::collector_endpoint(&server));

    let alpha_host = common::plugin("Alpha", "1.0", plugins.path());
    let beta_host = common::plugin("Beta", "1.0", plugins.path());
    let gamma_host = common::plugin("Gamma", "1.0", plugins.path());
    let alpha = harness.start(alpha_host);
    let _beta = harness.start(beta_host.clone());
    let _gamma = harness.start(gamma_host);

    beta_host.unload();
    harness.scheduler.tick().await;

    let snapshots = received_snapshots(&server).await;
    let names: Vec<_> = snapshots[0]["plugins"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["pluginName"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["Alpha", "Gamma"]);

    let metrics = alpha.metrics().unwrap();
    assert_eq!(metrics.fragments_total.with_label_values(&["dropped"]).get(), 1);
    assert_eq!(metrics.fragments_total.with_label_values(&["collected"]).get(), 2);
}

#[tokio::test]
async fn test_player_count_is_clamped_on_the_wire() {
    let plugins = tempfile::tempdir().unwrap();
    let server = common::setup_collector().await;
    let harness = Harness::new(common::collector_endpoint(&server));

    let host = common::plugin("Alpha", "1.0", plugins.path());
    let _alpha = harness.start(host.clone());

    host.set_environment(HostEnvironment {
        online_players: 2_000,
        online_mode: false,
        ..HostEnvironment::default()
    });
    harness.scheduler.tick().await;

    host.set_environment(HostEnvironment {
        online_players: 499,
        ..HostEnvironment::default()
    });
    harness.scheduler.tick().await;

    let snapshots = received_snapshots(&server).await;
    assert_eq!(snapshots.len(), 2);
    assert_eq!(snapshots[0]["playerAmount"], 500);
    assert_eq!(snapshots[0]["onlineMode"], 0);
    assert_eq!(snapshots[1]["playerAmount"], 499);
}

#[tokio::test]
async fn test_unreachable_collector_skips_cycle() {
    let plugins = tempfile::tempdir().unwrap();
    common::write_config(plugins.path(), true, true);
    // Nothing listens on a port that was just released.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let endpoint = format!(
        "http://{}{}",
        listener.local_addr().unwrap(),
        common::SUBMIT_PATH
    );
    drop(listener);

    let harness = Harness::new(endpoint);
    let alpha = harness.start(common::plugin("Alpha", "1.0", plugins.path()));

    harness.scheduler.tick().await;
    harness.scheduler.tick().await;

    assert_eq!(alpha.state(), ReporterState::Submitting);
    assert_eq!(alpha.metrics().unwrap().submissions(false), 2);
    assert!(alpha.submit_now().await.is_err());
}

#[tokio::test]
async fn test_collector_error_status_is_not_a_failure() {
    use wiremock::matchers::method;
    use wiremock::{Mock, ResponseTemplate};

    let plugins = tempfile::tempdir().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("collector down"))
        .expect(1)
        .mount(&server)
        .await;

    let harness = Harness::new(common::collector_endpoint(&server));
    let alpha = harness.start(common::plugin("Alpha", "1.0", plugins.path()));

    assert!(alpha.submit_now().await.is_ok());
    assert_eq!(alpha.metrics().unwrap().submissions(true), 1);
}
