// Roleplay API
// Main entry point for the roleplay binary

use clap::Parser;
use roleplay_engine::cli::{Cli, Command};
use roleplay_engine::config::Config;
use roleplay_engine::handlers::{handle_doctor, handle_serve, OutputFormat};
use roleplay_engine::telemetry::init_telemetry_with_level;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Variables already in the environment win over .env entries
    let dotenv = dotenvy::dotenv();

    // Load configuration (or use custom path if provided)
    let config = if let Some(config_path) = &cli.config {
        Config::load_from_path(config_path)?
    } else {
        Config::load_or_default()?
    };

    // CLI flag wins over config; RUST_LOG wins over both
    let log_level = cli.log.as_deref().unwrap_or(&config.core.log_level);
    init_telemetry_with_level(log_level);

    match dotenv {
        Ok(path) => tracing::debug!(path = %path.display(), "Loaded environment file"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, "Failed to read .env file"),
    }

    tracing::info!(
        "Roleplay v{} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_COMMIT_HASH")
    );

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    match cli.command() {
        Command::Serve { host, port } => {
            tracing::info!("Starting server...");
            handle_serve(&config, host, port).await
        }

        Command::Doctor { ping } => {
            tracing::info!("Running diagnostics...");
            handle_doctor(&config, ping, format).await
        }
    }
}
