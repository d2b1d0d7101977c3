//! Pipeline aggregate and run-state records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::DeploymentId;

/// Last-run status the server reports for a successful flow run.
pub const RUN_STATUS_COMPLETED: &str = "COMPLETED";

/// State-name marker set when the run completed but its data-quality tests
/// failed.
pub const STATE_TEST_FAILED: &str = "DBT_TEST_FAILED";

/// A pipeline as reported by the list endpoint.
///
/// Fetched on list load and on every poll tick; never mutated locally. The
/// ephemeral optimistic flag lives outside this aggregate, keyed by
/// `deployment_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pipeline {
    /// Server-side deployment identifier.
    pub deployment_id: DeploymentId,
    /// Human-readable pipeline name.
    pub name: String,
    /// UTC cron string, absent for manual-only pipelines.
    pub cron: Option<String>,
    /// Server-reported run claim, if any.
    pub lock: Option<LockRecord>,
    /// Most recent finished run, if any.
    pub last_run: Option<FlowRun>,
    /// Whether the pipeline is enabled at all.
    pub active: bool,
}

impl Pipeline {
    /// True while the server reports an in-flight claim on this pipeline
    /// (or on another pipeline sharing one of its connections).
    pub fn has_busy_lock(&self) -> bool {
        self.lock.as_ref().is_some_and(|l| l.status.is_busy())
    }
}

/// Server-side run claim on a pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockRecord {
    /// Who placed the claim.
    pub locked_by: String,
    /// When the claim was placed.
    pub locked_at: DateTime<Utc>,
    /// Claim state.
    pub status: LockStatus,
}

/// State of a server-side run claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LockStatus {
    /// Claimed, waiting for the orchestrator to pick it up.
    Locked,
    /// Accepted into the run queue.
    Queued,
    /// Actively running.
    Running,
    /// Finished but the claim has not been released yet.
    Complete,
}

impl LockStatus {
    /// True for claim states that mean "a run is still in flight".
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            LockStatus::Locked | LockStatus::Queued | LockStatus::Running
        )
    }
}

/// The most recent finished run of a pipeline.
///
/// Only semantically relevant when no [`LockRecord`] is present. `status` and
/// `state_name` are open string sets owned by the orchestrator; the console
/// only compares them against the markers above.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowRun {
    /// Run identifier (orchestrator-side, not a deployment id).
    pub id: String,
    /// Terminal status, e.g. "COMPLETED", "FAILED", "CRASHED".
    pub status: String,
    /// Terminal state name; may carry special markers.
    #[serde(rename = "state_name", default)]
    pub state_name: String,
    /// When the run actually started.
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    /// When the schedule expected it to start.
    #[serde(default)]
    pub expected_start_time: Option<DateTime<Utc>>,
    /// User who triggered the run, if it was manual.
    #[serde(default)]
    pub orguser: Option<String>,
}

/// The single authoritative status rendered for a pipeline row.
///
/// Derived from the optimistic flag, the lock record, and the last run;
/// never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayStatus {
    /// No signal at all; rendered as a placeholder.
    None,
    /// Client triggered a run, server has not acknowledged yet.
    LockedOptimistic,
    /// Server holds a claim (locked or complete-but-unreleased).
    Locked,
    /// Run accepted into the queue.
    Queued,
    /// Run in progress.
    Running,
    /// Last run finished successfully.
    Success,
    /// Last run failed.
    Failed,
    /// Last run finished but its tests failed.
    TestsFailed,
}

impl DisplayStatus {
    /// Badge text used by rendering code.
    pub fn label(&self) -> &'static str {
        match self {
            DisplayStatus::None => "\u{2014}",
            DisplayStatus::LockedOptimistic | DisplayStatus::Locked => "Locked",
            DisplayStatus::Queued => "Queued",
            DisplayStatus::Running => "Running",
            DisplayStatus::Success => "Success",
            DisplayStatus::Failed => "Failed",
            DisplayStatus::TestsFailed => "Tests failed",
        }
    }
}
