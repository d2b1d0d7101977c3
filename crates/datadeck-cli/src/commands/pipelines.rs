//! Pipeline commands.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::warn;

use datadeck_client::ConsoleClient;
use datadeck_console::{DEFAULT_POLL_INTERVAL, PipelineConsole, PipelineStore, PollingController};
use datadeck_core::DeploymentId;
use datadeck_schedule::describe;

fn console(api_url: &str) -> PipelineConsole {
    PipelineConsole::new(Arc::new(ConsoleClient::new(api_url)))
}

fn render(store: &PipelineStore) {
    println!("{:<38} {:<28} {:<26} {}", "DEPLOYMENT", "NAME", "SCHEDULE", "STATUS");
    for (pipeline, status) in store.rows() {
        println!(
            "{:<38} {:<28} {:<26} {}",
            pipeline.deployment_id,
            pipeline.name,
            describe(pipeline.cron.as_deref()),
            status.label()
        );
    }
}

pub async fn list(api_url: &str) -> Result<()> {
    let console = console(api_url);
    console.refresh().await?;
    render(&console.store());
    Ok(())
}

pub async fn trigger(api_url: &str, deployment: &str) -> Result<()> {
    let id: DeploymentId = deployment
        .parse()
        .with_context(|| format!("invalid deployment id: {deployment}"))?;

    let console = console(api_url);
    console.refresh().await?;
    console.trigger(&id).await?;
    println!("Run triggered for {id}");
    Ok(())
}

pub async fn watch(api_url: &str) -> Result<()> {
    let console = Arc::new(console(api_url));
    console.refresh().await?;
    render(&console.store());

    if !console.store().has_activity() {
        println!("No active runs.");
        return Ok(());
    }

    let mut poller = PollingController::new(DEFAULT_POLL_INTERVAL);
    let watched = console.clone();
    poller.start(move || {
        let watched = watched.clone();
        async move {
            if let Err(e) = watched.refresh().await {
                warn!(error = %e, "refresh failed");
                return true;
            }
            render(&watched.store());
            watched.store().has_activity()
        }
    });
    poller.join().await;

    println!("All runs settled.");
    Ok(())
}
