//! Shared console state: latest pipeline list, optimistic flags, and the
//! stale-fetch guard.

use std::collections::HashSet;
use std::sync::Mutex;

use datadeck_core::DeploymentId;
use datadeck_core::pipeline::{DisplayStatus, Pipeline};

use crate::status::resolve_status;

#[derive(Default)]
struct State {
    pipelines: Vec<Pipeline>,
    /// Deployments the client has triggered but the server has not yet
    /// acknowledged with a lock record.
    optimistic: HashSet<DeploymentId>,
    /// Sequence number handed to the most recent fetch.
    next_seq: u64,
    /// Sequence number of the most recent fetch that settled and applied.
    applied_seq: u64,
}

/// The only mutable state the console holds.
///
/// The internal mutex is never held across an await point; fetches run
/// outside it and report back through [`PipelineStore::apply_fetch`].
#[derive(Default)]
pub struct PipelineStore {
    inner: Mutex<State>,
}

impl PipelineStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fetch that is about to start and get its sequence number.
    pub fn begin_fetch(&self) -> u64 {
        let mut state = self.inner.lock().unwrap();
        state.next_seq += 1;
        state.next_seq
    }

    /// Apply a settled fetch. Returns false (and changes nothing) if a
    /// later-started fetch already settled; the last settled fetch wins.
    ///
    /// Applying clears every optimistic flag: the poll result is
    /// authoritative, and any still-pending trigger shows up in it as a
    /// lock record.
    pub fn apply_fetch(&self, seq: u64, pipelines: Vec<Pipeline>) -> bool {
        let mut state = self.inner.lock().unwrap();
        if seq <= state.applied_seq {
            return false;
        }
        state.applied_seq = seq;
        state.pipelines = pipelines;
        state.optimistic.clear();
        true
    }

    pub fn set_optimistic(&self, id: &DeploymentId) {
        self.inner.lock().unwrap().optimistic.insert(*id);
    }

    pub fn clear_optimistic(&self, id: &DeploymentId) {
        self.inner.lock().unwrap().optimistic.remove(id);
    }

    pub fn is_optimistic(&self, id: &DeploymentId) -> bool {
        self.inner.lock().unwrap().optimistic.contains(id)
    }

    /// Look up a pipeline from the last applied fetch.
    pub fn get(&self, id: &DeploymentId) -> Option<Pipeline> {
        self.inner
            .lock()
            .unwrap()
            .pipelines
            .iter()
            .find(|p| p.deployment_id == *id)
            .cloned()
    }

    /// Whether the run control for a pipeline should be enabled. False while
    /// an optimistic flag or a busy lock is present, and for inactive or
    /// unknown pipelines.
    pub fn can_trigger(&self, id: &DeploymentId) -> bool {
        let state = self.inner.lock().unwrap();
        if state.optimistic.contains(id) {
            return false;
        }
        state
            .pipelines
            .iter()
            .find(|p| p.deployment_id == *id)
            .is_some_and(|p| p.active && !p.has_busy_lock())
    }

    /// The polling predicate: true while any pipeline has a busy lock or an
    /// unresolved optimistic flag.
    pub fn has_activity(&self) -> bool {
        let state = self.inner.lock().unwrap();
        !state.optimistic.is_empty() || state.pipelines.iter().any(Pipeline::has_busy_lock)
    }

    /// Snapshot of the pipeline list from the last applied fetch.
    pub fn pipelines(&self) -> Vec<Pipeline> {
        self.inner.lock().unwrap().pipelines.clone()
    }

    /// Snapshot of every pipeline with its resolved display status.
    pub fn rows(&self) -> Vec<(Pipeline, DisplayStatus)> {
        let state = self.inner.lock().unwrap();
        state
            .pipelines
            .iter()
            .map(|p| {
                let optimistic = state.optimistic.contains(&p.deployment_id);
                (p.clone(), resolve_status(p, optimistic))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use datadeck_core::pipeline::{LockRecord, LockStatus};

    fn pipeline(id: DeploymentId, lock: Option<LockStatus>, active: bool) -> Pipeline {
        Pipeline {
            deployment_id: id,
            name: "p".to_string(),
            cron: Some("0 9 * * *".to_string()),
            lock: lock.map(|status| LockRecord {
                locked_by: "scheduler".to_string(),
                locked_at: Utc::now(),
                status,
            }),
            last_run: None,
            active,
        }
    }

    #[test]
    fn test_superseded_fetch_is_discarded() {
        let store = PipelineStore::new();
        let id_a = DeploymentId::new();
        let id_b = DeploymentId::new();

        let first = store.begin_fetch();
        let second = store.begin_fetch();

        // The later-started fetch settles first and wins.
        assert!(store.apply_fetch(second, vec![pipeline(id_b, None, true)]));
        assert!(!store.apply_fetch(first, vec![pipeline(id_a, None, true)]));

        let pipelines = store.pipelines();
        assert_eq!(pipelines.len(), 1);
        assert_eq!(pipelines[0].deployment_id, id_b);
    }

    #[test]
    fn test_applied_fetch_clears_optimistic_flags() {
        let store = PipelineStore::new();
        let id = DeploymentId::new();
        store.set_optimistic(&id);
        assert!(store.has_activity());

        let seq = store.begin_fetch();
        store.apply_fetch(seq, vec![pipeline(id, None, true)]);
        assert!(!store.is_optimistic(&id));
        assert!(!store.has_activity());
    }

    #[test]
    fn test_stale_fetch_does_not_clear_optimistic_flags() {
        let store = PipelineStore::new();
        let id = DeploymentId::new();

        let first = store.begin_fetch();
        let second = store.begin_fetch();
        store.apply_fetch(second, vec![pipeline(id, None, true)]);

        store.set_optimistic(&id);
        assert!(!store.apply_fetch(first, vec![]));
        assert!(store.is_optimistic(&id));
    }

    #[test]
    fn test_can_trigger_guards() {
        let store = PipelineStore::new();
        let idle = DeploymentId::new();
        let busy = DeploymentId::new();
        let inactive = DeploymentId::new();

        let seq = store.begin_fetch();
        store.apply_fetch(
            seq,
            vec![
                pipeline(idle, None, true),
                pipeline(busy, Some(LockStatus::Queued), true),
                pipeline(inactive, None, false),
            ],
        );

        assert!(store.can_trigger(&idle));
        assert!(!store.can_trigger(&busy));
        assert!(!store.can_trigger(&inactive));
        assert!(!store.can_trigger(&DeploymentId::new()));

        store.set_optimistic(&idle);
        assert!(!store.can_trigger(&idle));
    }

    #[test]
    fn test_has_activity_tracks_busy_locks() {
        let store = PipelineStore::new();
        let id = DeploymentId::new();

        let seq = store.begin_fetch();
        store.apply_fetch(seq, vec![pipeline(id, Some(LockStatus::Running), true)]);
        assert!(store.has_activity());

        let seq = store.begin_fetch();
        store.apply_fetch(seq, vec![pipeline(id, Some(LockStatus::Complete), true)]);
        assert!(!store.has_activity());
    }
}
