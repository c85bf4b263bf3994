//! Poll-confirm primitive.
//!
//! Remote writes take effect asynchronously; the only way to know one
//! landed is to keep asking the remote store. [`Poller`] evaluates a
//! predicate at a fixed interval until it reports true or the budget is
//! exhausted. No backoff: the remote store tolerates the query rate and
//! a steady cadence keeps the confirmation latency bounded.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep, Instant};
use tracing::warn;

use crate::error::Result;
use crate::shutdown::ShutdownCoordinator;

/// Interval between predicate evaluations.
pub const POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Default confirmation budget.
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(300);

/// Fixed-interval, bounded-budget poller.
#[derive(Clone, Default)]
pub struct Poller {
    interval: Option<Duration>,
    shutdown: Option<Arc<ShutdownCoordinator>>,
}

impl Poller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the evaluation interval (default 3 seconds).
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Attach a shutdown coordinator. The loop then stops between
    /// attempts when shutdown is requested, reporting not-confirmed.
    pub fn with_shutdown(mut self, shutdown: Arc<ShutdownCoordinator>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Evaluate `check` until it returns true or `timeout` elapses.
    ///
    /// The predicate runs immediately; a first-evaluation success
    /// returns without any wait, even with a zero timeout. Failed
    /// evaluations are retried after the fixed interval for as long as
    /// elapsed time stays within `timeout`. A predicate error aborts
    /// the loop at once: it is fatal for the calling operation, not a
    /// retryable miss.
    pub async fn poll_until<F, Fut>(&self, timeout: Duration, mut check: F) -> Result<bool>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<bool>>,
    {
        let interval = self.interval.unwrap_or(POLL_INTERVAL);
        let started = Instant::now();

        loop {
            if check().await? {
                return Ok(true);
            }

            if let Some(shutdown) = &self.shutdown {
                tokio::select! {
                    _ = sleep(interval) => {}
                    _ = shutdown.wait_for_shutdown() => {
                        warn!("Poll cancelled by shutdown after {:?}", started.elapsed());
                        return Ok(false);
                    }
                }
            } else {
                sleep(interval).await;
            }

            if started.elapsed() > timeout {
                return Ok(false);
            }
        }
    }
}
