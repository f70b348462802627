use anyhow::{Context, Result};
use brief_wizard::cli::{handle_command, Cli};
use brief_wizard::core::ConfigManager;
use clap::Parser;
use std::fs::OpenOptions;
use tracing::info;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    let cli = Cli::parse();

    let mut config = ConfigManager::load()?;
    cli.apply_overrides(&mut config);
    if cli.command.uses_archive() {
        config.ensure_directories().await?;
    }

    info!("Environment: {}", config.environment.name);
    info!("Brief backend: {}", config.service.brief_api_url);
    info!("Database: {}", config.environment.database_path.display());

    handle_command(cli.command, config).await
}

/// Human-readable logs on stderr, or JSON lines into `BRIEFGEN_LOG_FILE`
/// when it is set. `RUST_LOG` overrides the default `info` level.
fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match std::env::var("BRIEFGEN_LOG_FILE") {
        Ok(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("Failed to open log file: {}", path))?;

            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(file)
                        .with_current_span(false)
                        .with_span_list(false),
                )
                .with(filter)
                .init();
        }
        Err(_) => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
                .with(filter)
                .init();
        }
    }

    Ok(())
}
