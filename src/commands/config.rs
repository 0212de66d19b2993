//! Configuration management CLI commands.

use clap::{Args, Subcommand};

use revstore_core::config::AppConfig;
use revstore_core::error::AppError;

use crate::output::{self, OutputFormat};

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,
    /// Validate the configuration
    Validate,
}

/// Execute config commands
pub fn execute(
    args: &ConfigArgs,
    config: &AppConfig,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => match format {
            OutputFormat::Json => output::print_json(config),
            OutputFormat::Table => {
                let tree = serde_json::to_value(config)
                    .map_err(|e| AppError::internal(format!("Cannot render config: {}", e)))?;
                print_section("", &tree);
            }
        },
        ConfigCommand::Validate => {
            config.validate()?;
            output::print_success(&format!("Configuration '{}' is valid", config_path));
            output::print_kv("Node", &config.node.id);
            output::print_kv("Storage", &format!("{:?}", config.storage.provider));
            output::print_kv("Metadata", &format!("{:?}", config.metadata.backend));
            output::print_kv("Dispatch", &format!("{:?}", config.transfer.dispatch));
        }
    }
    Ok(())
}

/// Print nested settings as dotted keys.
fn print_section(prefix: &str, value: &serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                print_section(&path, child);
            }
        }
        serde_json::Value::String(s) => output::print_kv(prefix, s),
        other => output::print_kv(prefix, &other.to_string()),
    }
}
