//! Tokio scheduler binding
//!
//! [`TokioScheduler`] implements the host's repeating-task primitive for
//! hosts that already run a tokio runtime. Each schedule becomes one spawned
//! task; runs of the same schedule never overlap.
//!
//! ## Cadence
//!
//! The first run happens after [`INITIAL_DELAY`], a grace period that lets
//! sibling reporters finish registering. Later runs follow every
//! [`SUBMIT_PERIOD`].

use std::time::Duration;

use plugmetrics_core::ports::{ITaskScheduler, ScheduledTask};
use tokio::runtime::Handle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Delay before the first submission
pub const INITIAL_DELAY: Duration = Duration::from_secs(2 * 60);

/// Interval between submissions
pub const SUBMIT_PERIOD: Duration = Duration::from_secs(30 * 60);

/// Repeating-task scheduler backed by a tokio runtime
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    handle: Handle,
    shutdown: CancellationToken,
}

impl TokioScheduler {
    /// Creates a scheduler spawning onto `handle` until `shutdown` fires.
    pub fn new(handle: Handle, shutdown: CancellationToken) -> Self {
        Self { handle, shutdown }
    }

    /// Creates a scheduler on the runtime the caller is running in.
    pub fn current(shutdown: CancellationToken) -> anyhow::Result<Self> {
        Ok(Self::new(Handle::try_current()?, shutdown))
    }
}

impl ITaskScheduler for TokioScheduler {
    fn schedule_repeating(
        &self,
        initial_delay: Duration,
        period: Duration,
        task: ScheduledTask,
    ) -> anyhow::Result<()> {
        if period.is_zero() {
            anyhow::bail!("period must be greater than zero");
        }

        let shutdown = self.shutdown.clone();
        self.handle.spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + initial_delay, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => task().await,
                    _ = shutdown.cancelled() => {
                        debug!("Repeating task cancelled");
                        break;
                    }
                }
            }
        });

        debug!(
            initial_delay_secs = initial_delay.as_secs(),
            period_secs = period.as_secs(),
            "Scheduled repeating task"
        );
        Ok(())
    }
}
