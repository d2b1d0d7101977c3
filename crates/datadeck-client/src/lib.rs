//! HTTP client for the Datadeck platform API.
//!
//! A thin typed wrapper over the two REST endpoints the console consumes:
//! the pipeline list (with lock and last-run records) and the run trigger.

pub mod error;

pub use error::{ClientError, Result};

use async_trait::async_trait;
use reqwest::{Client, Response};
use tracing::debug;

use datadeck_core::pipeline::Pipeline;
use datadeck_core::{DeploymentId, PipelineApi};

/// Client for the platform's pipeline endpoints.
#[derive(Debug, Clone)]
pub struct ConsoleClient {
    base_url: String,
    client: Client,
}

impl ConsoleClient {
    /// Create a client for the given base URL, e.g. "http://localhost:8002".
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a client with a preconfigured `reqwest::Client` (timeouts,
    /// proxies, TLS).
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn check(response: Response) -> Result<Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(ClientError::Status { status, body })
    }

    /// Fetch the pipeline list.
    pub async fn list_pipelines(&self) -> Result<Vec<Pipeline>> {
        let url = self.url("/api/pipelines/");
        debug!(%url, "fetching pipeline list");
        let response = self.client.get(&url).send().await?;
        let pipelines = Self::check(response).await?.json().await?;
        Ok(pipelines)
    }

    /// Ask the server to start a run of the given deployment.
    pub async fn trigger_run(&self, deployment_id: &DeploymentId) -> Result<()> {
        let url = self.url(&format!("/api/pipelines/{deployment_id}/run/"));
        debug!(%url, "triggering run");
        let response = self.client.post(&url).send().await?;
        Self::check(response).await?;
        Ok(())
    }
}

#[async_trait]
impl PipelineApi for ConsoleClient {
    async fn list_pipelines(&self) -> datadeck_core::Result<Vec<Pipeline>> {
        ConsoleClient::list_pipelines(self).await.map_err(Into::into)
    }

    async fn trigger_run(&self, deployment_id: &DeploymentId) -> datadeck_core::Result<()> {
        ConsoleClient::trigger_run(self, deployment_id)
            .await
            .map_err(Into::into)
    }
}
