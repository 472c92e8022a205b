//! Task scheduler port (driven/secondary port)
//!
//! The host runtime owns the concurrency primitive that drives periodic
//! work. The reporter hands it a task, a grace delay and a period, and
//! never asks for it back: there is no cancellation from the reporter side.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;

/// A repeating unit of work; each call yields one run.
pub type ScheduledTask = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// Port trait for the host's repeating-task primitive
pub trait ITaskScheduler: Send + Sync {
    /// Runs `task` after `initial_delay`, then every `period`
    ///
    /// Runs must execute off any latency-sensitive path of the host.
    fn schedule_repeating(
        &self,
        initial_delay: Duration,
        period: Duration,
        task: ScheduledTask,
    ) -> anyhow::Result<()>;
}
