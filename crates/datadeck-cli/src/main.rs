//! Datadeck console CLI.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "datadeck")]
#[command(about = "Datadeck pipeline console CLI", long_about = None)]
struct Cli {
    /// API server URL
    #[arg(long, env = "DATADECK_API_URL", default_value = "http://localhost:8002")]
    api_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage pipelines
    Pipelines {
        #[command(subcommand)]
        command: PipelineCommands,
    },
    /// Inspect schedules
    Schedule {
        #[command(subcommand)]
        command: ScheduleCommands,
    },
}

#[derive(Subcommand)]
enum PipelineCommands {
    /// List pipelines with schedule and run status
    List,
    /// Trigger a run
    Trigger {
        /// Deployment ID
        deployment: String,
    },
    /// Poll run status until every pipeline is idle
    Watch,
}

#[derive(Subcommand)]
enum ScheduleCommands {
    /// Render a stored UTC cron in local terms
    Describe {
        /// Cron expression, e.g. "0 22 * * 3"
        cron: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Pipelines { command } => match command {
            PipelineCommands::List => {
                commands::pipelines::list(&cli.api_url).await?;
            }
            PipelineCommands::Trigger { deployment } => {
                commands::pipelines::trigger(&cli.api_url, &deployment).await?;
            }
            PipelineCommands::Watch => {
                commands::pipelines::watch(&cli.api_url).await?;
            }
        },
        Commands::Schedule { command } => match command {
            ScheduleCommands::Describe { cron } => {
                commands::schedule::describe_cron(&cron)?;
            }
        },
    }

    Ok(())
}
