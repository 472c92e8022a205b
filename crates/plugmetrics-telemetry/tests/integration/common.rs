//! Shared helpers for reporter integration tests
//!
//! Provides a scheduler that records schedules instead of running them, a
//! fake plugin host per plugin name, and a wiremock collector.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use plugmetrics_core::ports::{
    HostEnvironment, ITaskScheduler, PluginDescriptor, ScheduledTask, StaticPluginHost,
};
use plugmetrics_telemetry::{LinkTable, MetricsReporter, SubmitClient};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Path the mock collector listens on.
pub const SUBMIT_PATH: &str = "/submitData/bungeecord";

/// Scheduler that keeps every task so tests can fire ticks by hand.
#[derive(Default)]
pub struct ManualScheduler {
    tasks: Mutex<Vec<ScheduledTask>>,
}

impl ManualScheduler {
    pub fn scheduled(&self) -> usize {
        self.tasks.lock().unwrap().len()
    }

    /// Runs every scheduled task once.
    pub async fn tick(&self) {
        let tasks: Vec<ScheduledTask> = self.tasks.lock().unwrap().clone();
        for task in tasks {
            task().await;
        }
    }
}

impl ITaskScheduler for ManualScheduler {
    fn schedule_repeating(
        &self,
        _initial_delay: Duration,
        _period: Duration,
        task: ScheduledTask,
    ) -> anyhow::Result<()> {
        self.tasks.lock().unwrap().push(task);
        Ok(())
    }
}

/// A loaded plugin called `name` whose data folder lives under `plugins_dir`.
pub fn plugin(name: &str, version: &str, plugins_dir: &Path) -> Arc<StaticPluginHost> {
    Arc::new(
        StaticPluginHost::new(PluginDescriptor::new(name, version), plugins_dir.join(name))
            .with_environment(HostEnvironment {
                online_players: 42,
                managed_servers: 3,
                online_mode: true,
                host_version: "proxy-1.20".to_string(),
                runtime_version: "17.0.8".to_string(),
            }),
    )
}

/// One embedded reporter wired to test doubles.
pub struct Harness {
    pub links: Arc<LinkTable>,
    pub scheduler: Arc<ManualScheduler>,
    pub client: Arc<SubmitClient>,
}

impl Harness {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            links: Arc::new(LinkTable::new()),
            scheduler: Arc::new(ManualScheduler::default()),
            client: Arc::new(SubmitClient::with_endpoint(endpoint)),
        }
    }

    /// Endpoint nobody listens on, for tests that never submit.
    pub fn offline() -> Self {
        Self::new("http://127.0.0.1:9/submitData/bungeecord")
    }

    pub fn start(&self, host: Arc<StaticPluginHost>) -> Arc<MetricsReporter> {
        MetricsReporter::builder(host, self.scheduler.clone())
            .link_table(self.links.clone())
            .sink(self.client.clone())
            .start()
    }
}

/// Starts a collector that accepts every submission.
pub async fn setup_collector() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SUBMIT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;
    server
}

pub fn collector_endpoint(server: &MockServer) -> String {
    format!("{}{}", server.uri(), SUBMIT_PATH)
}

/// Writes a config file with the given switches into `plugins_dir`'s shared directory.
#[allow(dead_code)]
pub fn write_config(plugins_dir: &Path, enabled: bool, log_failed_requests: bool) {
    let dir = plugins_dir.join("plugmetrics");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("config.yml"),
        format!(
            "enabled: {enabled}\nserverUuid: \"{}\"\nlogFailedRequests: {log_failed_requests}\n",
            uuid::Uuid::new_v4()
        ),
    )
    .unwrap();
}
