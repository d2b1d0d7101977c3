//! The single repeating timer behind the pipeline list.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

/// Poll cadence while some pipeline is busy.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(3000);

/// Owns exactly one repeating timer.
///
/// The tick future is awaited to completion before the next interval fires,
/// so a slow fetch can never overlap itself. `start` refuses to schedule a
/// second timer while one is live; `stop` (and drop) cancel immediately.
pub struct PollingController {
    interval: Duration,
    task: Option<JoinHandle<()>>,
}

impl PollingController {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            task: None,
        }
    }

    /// Start polling. `tick` runs once per interval and returns whether to
    /// keep going; returning false stops the timer for good.
    ///
    /// Returns false without scheduling anything if a timer is already live.
    pub fn start<T, Fut>(&mut self, mut tick: T) -> bool
    where
        T: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = bool> + Send,
    {
        if self.is_running() {
            return false;
        }
        let interval = self.interval;
        debug!(interval_ms = interval.as_millis() as u64, "starting poll timer");
        self.task = Some(tokio::spawn(async move {
            let mut timer = tokio::time::interval(interval);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first interval tick completes immediately; consume it so
            // ticks land one full interval apart.
            timer.tick().await;
            loop {
                timer.tick().await;
                if !tick().await {
                    break;
                }
            }
            debug!("poll predicate went false, timer stopped");
        }));
        true
    }

    /// True while the timer task is live (not stopped, not self-terminated).
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Cancel the timer immediately. Idempotent.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            debug!("poll timer cancelled");
        }
    }

    /// Wait for the timer to stop on its own (tick returned false).
    pub async fn join(&mut self) {
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for PollingController {
    fn drop(&mut self) {
        self.stop();
    }
}
