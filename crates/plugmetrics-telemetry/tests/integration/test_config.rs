//! Integration tests for the shared config file
//!
//! - First start creates the file, later starts reuse the same serverUuid
//! - `enabled: false` means no schedule and no request, ever
//! - An unparseable file disables the instance

use plugmetrics_core::config::ReporterConfig;
use plugmetrics_core::domain::ReporterState;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{self, Harness};

#[test]
fn test_first_start_creates_config_and_restart_reuses_it() {
    let plugins = tempfile::tempdir().unwrap();
    let config_file = plugins.path().join("plugmetrics/config.yml");

    let first = Harness::offline().start(common::plugin("Alpha", "1.0", plugins.path()));
    assert!(config_file.exists());
    let created = std::fs::read_to_string(&config_file).unwrap();
    assert!(created.starts_with('#'));
    let uuid = first.config().expect("config loaded").server_uuid;
    drop(first);

    let second = Harness::offline().start(common::plugin("Alpha", "1.0", plugins.path()));
    assert_eq!(second.config().unwrap().server_uuid, uuid);
    assert_eq!(std::fs::read_to_string(&config_file).unwrap(), created);
}

#[test]
fn test_all_plugins_share_one_config() {
    let plugins = tempfile::tempdir().unwrap();
    let harness = Harness::offline();

    let alpha = harness.start(common::plugin("Alpha", "1.0", plugins.path()));
    let beta = harness.start(common::plugin("Beta", "2.0", plugins.path()));

    assert_eq!(
        alpha.config().unwrap().server_uuid,
        beta.config().unwrap().server_uuid
    );
}

#[tokio::test]
async fn test_disabled_config_never_schedules_or_sends() {
    let plugins = tempfile::tempdir().unwrap();
    common::write_config(plugins.path(), false, true);

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let harness = Harness::new(common::collector_endpoint(&server));
    let alpha = harness.start(common::plugin("Alpha", "1.0", plugins.path()));
    let beta = harness.start(common::plugin("Beta", "1.0", plugins.path()));

    assert_eq!(alpha.state(), ReporterState::Disabled);
    assert_eq!(beta.state(), ReporterState::Disabled);
    assert_eq!(harness.scheduler.scheduled(), 0);
    assert!(alpha.submit_now().await.is_err());
    assert!(!plugins.path().join("plugmetrics/leader.txt").exists());

    server.verify().await;
}

#[test]
fn test_unparseable_config_disables_instance() {
    let plugins = tempfile::tempdir().unwrap();
    let dir = plugins.path().join("plugmetrics");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("config.yml"), "enabled: true\nserverUuid: not-a-uuid\n").unwrap();

    let harness = Harness::offline();
    let alpha = harness.start(common::plugin("Alpha", "1.0", plugins.path()));

    assert_eq!(alpha.state(), ReporterState::Disabled);
    assert!(alpha.config().is_none());
    assert_eq!(harness.scheduler.scheduled(), 0);
    assert!(ReporterConfig::load(&dir.join("config.yml")).is_err());
}
