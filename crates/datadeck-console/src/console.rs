//! The console service: trigger flow, guarded refresh, polling lifecycle.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{debug, info, warn};

use datadeck_core::{DeploymentId, Error, PipelineApi, Result};

use crate::poller::{DEFAULT_POLL_INTERVAL, PollingController};
use crate::store::PipelineStore;

/// Ties the store, the API collaborator, and the poll timer together.
///
/// One instance backs the pipeline list view for its whole lifetime;
/// dropping it (or calling [`PipelineConsole::shutdown`]) cancels polling.
pub struct PipelineConsole {
    api: Arc<dyn PipelineApi>,
    store: Arc<PipelineStore>,
    poller: Mutex<PollingController>,
}

impl PipelineConsole {
    pub fn new(api: Arc<dyn PipelineApi>) -> Self {
        Self::with_interval(api, DEFAULT_POLL_INTERVAL)
    }

    pub fn with_interval(api: Arc<dyn PipelineApi>, interval: Duration) -> Self {
        Self {
            api,
            store: Arc::new(PipelineStore::new()),
            poller: Mutex::new(PollingController::new(interval)),
        }
    }

    pub fn store(&self) -> Arc<PipelineStore> {
        self.store.clone()
    }

    /// Fetch the pipeline list once, guarded against stale responses: if a
    /// later-started fetch already settled, this result is discarded.
    pub async fn refresh(&self) -> Result<()> {
        let seq = self.store.begin_fetch();
        let pipelines = self.api.list_pipelines().await?;
        if !self.store.apply_fetch(seq, pipelines) {
            debug!(seq, "discarded superseded pipeline fetch");
        }
        Ok(())
    }

    /// Trigger a run of a pipeline.
    ///
    /// The optimistic flag is set before the request goes out so the run
    /// control disables immediately; on failure it is reverted so the
    /// control re-enables. On success the flag stays until the next applied
    /// poll supersedes it with the server's own lock record.
    pub async fn trigger(&self, id: &DeploymentId) -> Result<()> {
        let Some(pipeline) = self.store.get(id) else {
            return Err(Error::NotFound(format!("pipeline {id}")));
        };
        if !pipeline.active {
            return Err(Error::Conflict(format!("pipeline {id} is inactive")));
        }
        if !self.store.can_trigger(id) {
            return Err(Error::Conflict(format!(
                "pipeline {id} already has a run in flight"
            )));
        }

        self.store.set_optimistic(id);
        match self.api.trigger_run(id).await {
            Ok(()) => {
                info!(deployment_id = %id, "run triggered");
                self.ensure_polling();
                Ok(())
            }
            Err(e) => {
                self.store.clear_optimistic(id);
                Err(e)
            }
        }
    }

    /// Start the poll timer if it is not already running. Each tick
    /// re-fetches the list and keeps going while any pipeline is busy; a
    /// failed fetch is logged and retried on the next interval.
    pub fn ensure_polling(&self) {
        let mut poller = self.poller.lock().unwrap();
        if poller.is_running() {
            return;
        }
        let api = self.api.clone();
        let store = self.store.clone();
        poller.start(move || {
            let api = api.clone();
            let store = store.clone();
            async move {
                let seq = store.begin_fetch();
                match api.list_pipelines().await {
                    Ok(pipelines) => {
                        store.apply_fetch(seq, pipelines);
                        store.has_activity()
                    }
                    Err(e) => {
                        // One failed fetch is not terminal; keep the timer.
                        warn!(error = %e, "pipeline poll failed");
                        true
                    }
                }
            }
        });
    }

    pub fn is_polling(&self) -> bool {
        self.poller.lock().unwrap().is_running()
    }

    /// Cancel polling on teardown.
    pub fn shutdown(&self) {
        self.poller.lock().unwrap().stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use datadeck_core::pipeline::{LockRecord, LockStatus, Pipeline};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use tokio::time::sleep;

    struct FakeApi {
        pipelines: Mutex<Vec<Pipeline>>,
        fail_trigger: AtomicBool,
        list_calls: AtomicUsize,
    }

    impl FakeApi {
        fn new(pipelines: Vec<Pipeline>) -> Arc<Self> {
            Arc::new(Self {
                pipelines: Mutex::new(pipelines),
                fail_trigger: AtomicBool::new(false),
                list_calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl PipelineApi for FakeApi {
        async fn list_pipelines(&self) -> Result<Vec<Pipeline>> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.pipelines.lock().unwrap().clone())
        }

        async fn trigger_run(&self, _deployment_id: &DeploymentId) -> Result<()> {
            if self.fail_trigger.load(Ordering::SeqCst) {
                return Err(Error::Api("trigger rejected".to_string()));
            }
            Ok(())
        }
    }

    fn pipeline(id: DeploymentId, lock: Option<LockStatus>) -> Pipeline {
        Pipeline {
            deployment_id: id,
            name: "nightly-sync".to_string(),
            cron: Some("0 9 * * *".to_string()),
            lock: lock.map(|status| LockRecord {
                locked_by: "scheduler".to_string(),
                locked_at: Utc::now(),
                status,
            }),
            last_run: None,
            active: true,
        }
    }

    #[tokio::test]
    async fn test_trigger_sets_and_keeps_optimistic_flag() {
        let id = DeploymentId::new();
        let api = FakeApi::new(vec![pipeline(id, None)]);
        let console = PipelineConsole::new(api);

        console.refresh().await.unwrap();
        console.trigger(&id).await.unwrap();

        assert!(console.store.is_optimistic(&id));
        // Control stays disabled until the next poll supersedes the flag.
        assert!(matches!(console.trigger(&id).await, Err(Error::Conflict(_))));
        console.shutdown();
    }

    #[tokio::test]
    async fn test_trigger_failure_reverts_optimistic_flag() {
        let id = DeploymentId::new();
        let api = FakeApi::new(vec![pipeline(id, None)]);
        api.fail_trigger.store(true, Ordering::SeqCst);
        let console = PipelineConsole::new(api);

        console.refresh().await.unwrap();
        assert!(console.trigger(&id).await.is_err());
        assert!(!console.store.is_optimistic(&id));
        // The control re-enables, so a retry is allowed.
        assert!(console.store.can_trigger(&id));
    }

    #[tokio::test]
    async fn test_trigger_unknown_pipeline() {
        let api = FakeApi::new(vec![]);
        let console = PipelineConsole::new(api);
        console.refresh().await.unwrap();
        assert!(matches!(
            console.trigger(&DeploymentId::new()).await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_trigger_refused_while_lock_is_busy() {
        let id = DeploymentId::new();
        let api = FakeApi::new(vec![pipeline(id, Some(LockStatus::Running))]);
        let console = PipelineConsole::new(api);
        console.refresh().await.unwrap();
        assert!(matches!(console.trigger(&id).await, Err(Error::Conflict(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_polling_stops_once_idle() {
        let id = DeploymentId::new();
        let api = FakeApi::new(vec![pipeline(id, Some(LockStatus::Running))]);
        let console = PipelineConsole::with_interval(api.clone(), Duration::from_secs(3));

        console.refresh().await.unwrap();
        assert!(console.store.has_activity());
        console.ensure_polling();
        assert!(console.is_polling());

        // Two more polls still see the running lock.
        sleep(Duration::from_secs(7)).await;
        assert!(console.is_polling());

        // Server releases the lock; the next poll sees an idle list and the
        // timer stops itself.
        *api.pipelines.lock().unwrap() = vec![pipeline(id, None)];
        sleep(Duration::from_secs(7)).await;
        assert!(!console.is_polling());

        let settled = api.list_calls.load(Ordering::SeqCst);
        sleep(Duration::from_secs(30)).await;
        assert_eq!(api.list_calls.load(Ordering::SeqCst), settled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ensure_polling_does_not_double_schedule() {
        let id = DeploymentId::new();
        let api = FakeApi::new(vec![pipeline(id, Some(LockStatus::Queued))]);
        let console = PipelineConsole::with_interval(api.clone(), Duration::from_secs(3));

        console.refresh().await.unwrap();
        console.ensure_polling();
        console.ensure_polling();
        console.ensure_polling();

        sleep(Duration::from_secs(4)).await;
        // One refresh plus one poll tick, not three timers' worth.
        assert_eq!(api.list_calls.load(Ordering::SeqCst), 2);
        console.shutdown();
    }
}
