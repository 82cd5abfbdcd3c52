use anyhow::Result;
use catcheat_core::{config::Config, migration, server, telemetry};
use clap::{Parser, Subcommand};
use tracing::info;

#[derive(Parser)]
#[command(name = "catcheat-core")]
#[command(about = "CatchEat store service backend", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Create the database if missing and apply migrations
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    let prometheus_handle = telemetry::init(&config.telemetry)?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            info!("Starting CatchEat Core Service");
            info!("HTTP server listening on {}", config.http_addr());
            server::run(config, prometheus_handle).await
        }
        Command::Migrate => migration::run_migrations(&config).await,
    }
}
