//! Pure three-way merge of run-state signals into a display status.

use datadeck_core::pipeline::{
    DisplayStatus, LockStatus, Pipeline, RUN_STATUS_COMPLETED, STATE_TEST_FAILED,
};

/// Resolve the single status shown for a pipeline row.
///
/// Precedence, highest first: a server lock (running > queued > locked or
/// complete, which both render as locked), then the client's optimistic
/// flag, then whatever the last run says, then nothing. The lock always
/// wins over the optimistic flag, which is how the flag gets superseded
/// once the server acknowledges a trigger.
pub fn resolve_status(pipeline: &Pipeline, optimistic: bool) -> DisplayStatus {
    if let Some(lock) = &pipeline.lock {
        return match lock.status {
            LockStatus::Running => DisplayStatus::Running,
            LockStatus::Queued => DisplayStatus::Queued,
            LockStatus::Locked | LockStatus::Complete => DisplayStatus::Locked,
        };
    }
    if optimistic {
        return DisplayStatus::LockedOptimistic;
    }
    match &pipeline.last_run {
        Some(run) if run.state_name == STATE_TEST_FAILED => DisplayStatus::TestsFailed,
        Some(run) if run.status == RUN_STATUS_COMPLETED => DisplayStatus::Success,
        Some(_) => DisplayStatus::Failed,
        None => DisplayStatus::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use datadeck_core::DeploymentId;
    use datadeck_core::pipeline::{FlowRun, LockRecord};

    fn pipeline(lock: Option<LockStatus>, last_run: Option<(&str, &str)>) -> Pipeline {
        Pipeline {
            deployment_id: DeploymentId::new(),
            name: "p".to_string(),
            cron: None,
            lock: lock.map(|status| LockRecord {
                locked_by: "scheduler".to_string(),
                locked_at: Utc::now(),
                status,
            }),
            last_run: last_run.map(|(status, state_name)| FlowRun {
                id: "run-1".to_string(),
                status: status.to_string(),
                state_name: state_name.to_string(),
                start_time: None,
                expected_start_time: None,
                orguser: None,
            }),
            active: true,
        }
    }

    #[test]
    fn test_lock_beats_last_run() {
        // A running lock must never be reported as the old failure.
        let p = pipeline(Some(LockStatus::Running), Some(("FAILED", "Failed")));
        assert_eq!(resolve_status(&p, false), DisplayStatus::Running);

        let p = pipeline(Some(LockStatus::Queued), Some(("COMPLETED", "Completed")));
        assert_eq!(resolve_status(&p, false), DisplayStatus::Queued);
    }

    #[test]
    fn test_locked_and_complete_render_the_same() {
        let p = pipeline(Some(LockStatus::Locked), None);
        assert_eq!(resolve_status(&p, false), DisplayStatus::Locked);
        let p = pipeline(Some(LockStatus::Complete), None);
        assert_eq!(resolve_status(&p, false), DisplayStatus::Locked);
    }

    #[test]
    fn test_lock_supersedes_optimistic_flag() {
        let p = pipeline(Some(LockStatus::Running), None);
        assert_eq!(resolve_status(&p, true), DisplayStatus::Running);
    }

    #[test]
    fn test_optimistic_without_lock() {
        let p = pipeline(None, Some(("FAILED", "Failed")));
        assert_eq!(resolve_status(&p, true), DisplayStatus::LockedOptimistic);
    }

    #[test]
    fn test_last_run_derivation() {
        let p = pipeline(None, Some(("COMPLETED", "Completed")));
        assert_eq!(resolve_status(&p, false), DisplayStatus::Success);

        let p = pipeline(None, Some(("FAILED", "Failed")));
        assert_eq!(resolve_status(&p, false), DisplayStatus::Failed);

        let p = pipeline(None, Some(("CRASHED", "Crashed")));
        assert_eq!(resolve_status(&p, false), DisplayStatus::Failed);

        // The tests-failed marker wins even though the run completed.
        let p = pipeline(None, Some(("COMPLETED", "DBT_TEST_FAILED")));
        assert_eq!(resolve_status(&p, false), DisplayStatus::TestsFailed);
    }

    #[test]
    fn test_no_signals_at_all() {
        let p = pipeline(None, None);
        assert_eq!(resolve_status(&p, false), DisplayStatus::None);
    }

    #[test]
    fn test_shared_connection_scenario() {
        // One fetch may report several pipelines locked while exactly one
        // runs, reflecting server-side propagation across a shared
        // connection. Rendered as-is.
        let batch = vec![
            pipeline(Some(LockStatus::Running), None),
            pipeline(Some(LockStatus::Locked), None),
            pipeline(Some(LockStatus::Locked), None),
        ];
        let statuses: Vec<DisplayStatus> =
            batch.iter().map(|p| resolve_status(p, false)).collect();
        assert_eq!(
            statuses.iter().filter(|s| **s == DisplayStatus::Running).count(),
            1
        );
        assert_eq!(
            statuses.iter().filter(|s| **s == DisplayStatus::Locked).count(),
            2
        );
    }
}
