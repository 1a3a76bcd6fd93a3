use anyhow::Result;
use clap::Parser;
use job_tracker::admin_cli::{handle_command, Cli, Command};
use job_tracker::{start_web_server, EnvironmentConfig};
use std::fs::OpenOptions;
use tracing::info;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging first
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true) // Clear file on startup
        .open("/tmp/jobtrack.log")
        .expect("Failed to open log file");

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .json()
                .with_writer(file)
                .with_current_span(false)
                .with_span_list(false),
        )
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("job_tracker=info,rocket::server=off")),
        )
        .init();

    let cli = Cli::parse();

    // Load configuration for the selected environment
    let environment = EnvironmentConfig::load()?;

    match cli.command {
        Some(Command::Serve) | None => {
            let port = std::env::var("ROCKET_PORT")
                .map_err(|_| anyhow::anyhow!("ROCKET_PORT environment variable not set"))?
                .parse::<u16>()
                .map_err(|_| anyhow::anyhow!("ROCKET_PORT must be a valid port number"))?;

            info!("Starting job tracker API server");
            info!(
                "Environment: {}",
                std::env::var("ENVIRONMENT").unwrap_or_else(|_| "local".to_string())
            );
            info!("Database: {}", environment.database_path.display());
            info!("Server: http://0.0.0.0:{}", port);

            start_web_server(environment, port).await
        }
        Some(command) => handle_command(command, &environment).await,
    }
}
