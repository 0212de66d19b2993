//! Revstore: file content storage node
//!
//! Command-line entry point that wires all crates together and runs one
//! operation against the configured node.

mod commands;
mod output;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use revstore_core::config::AppConfig;
use revstore_core::error::AppError;

use crate::commands::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_configuration(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = cli.execute(config).await {
        output::print_error(&e.to_string());
        std::process::exit(1);
    }
}

/// Load configuration from file, environment overlay and variables
fn load_configuration(cli: &Cli) -> Result<AppConfig, AppError> {
    let env = cli
        .env
        .clone()
        .or_else(|| std::env::var("REVSTORE_ENV").ok())
        .unwrap_or_else(|| "development".to_string());

    AppConfig::load(&cli.config, &env)
        .map_err(|e| AppError::configuration(format!("Config load error: {}", e)))
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    // Logs go to stderr so downloads can stream to stdout.
    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}
