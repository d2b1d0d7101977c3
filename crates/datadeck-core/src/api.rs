//! Collaborator interface to the platform backend.

use async_trait::async_trait;

use crate::pipeline::Pipeline;
use crate::{DeploymentId, Result};

/// The REST surface this subsystem consumes.
///
/// Implemented by the HTTP client crate; mocked in console tests.
#[async_trait]
pub trait PipelineApi: Send + Sync {
    /// Fetch the full pipeline list, including lock and last-run records.
    async fn list_pipelines(&self) -> Result<Vec<Pipeline>>;

    /// Ask the server to start a run of the given deployment.
    async fn trigger_run(&self, deployment_id: &DeploymentId) -> Result<()>;
}
