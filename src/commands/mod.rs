//! CLI command definitions and dispatch.

pub mod config;
pub mod create;
pub mod dispose;
pub mod download;
pub mod info;
pub mod upload;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use revstore_core::config::{AppConfig, DispatchMode};
use revstore_core::error::AppError;
use revstore_database::build_revision_store;
use revstore_service::Services;
use revstore_storage::transfer::{InlineScheduler, TransferScheduler};
use revstore_storage::build_provider;
use revstore_worker::{PooledScheduler, WorkerPool};

use crate::output::OutputFormat;

/// Revstore: file content storage node
#[derive(Debug, Parser)]
#[command(name = "revstore", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Environment overlay name (falls back to REVSTORE_ENV)
    #[arg(short, long)]
    pub env: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Register a new, empty file
    Create(create::CreateArgs),
    /// Upload content into a new file
    Upload(upload::UploadArgs),
    /// Download a file or byte ranges of it
    Download(download::DownloadArgs),
    /// Show a file descriptor
    Info(info::InfoArgs),
    /// Dispose a file and its content
    Dispose(dispose::DisposeArgs),
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: AppConfig) -> Result<(), AppError> {
        if let Commands::Config(args) = &self.command {
            return config::execute(args, &config, &self.config, self.format);
        }

        let node = Node::start(&config).await?;
        let result = match &self.command {
            Commands::Create(args) => create::execute(args, &node.services, self.format).await,
            Commands::Upload(args) => {
                upload::execute(args, &node.services, &config, self.format).await
            }
            Commands::Download(args) => {
                download::execute(args, &node.services, self.format).await
            }
            Commands::Info(args) => info::execute(args, &node.services, self.format).await,
            Commands::Dispose(args) => dispose::execute(args, &node.services).await,
            Commands::Config(_) => Ok(()),
        };
        node.shutdown().await;
        result
    }
}

/// A running storage node: wired services plus the worker pool when
/// transfers are pooled.
pub struct Node {
    /// Wired services.
    pub services: Services,
    /// Pool running pooled transfers.
    pool: Option<WorkerPool>,
}

impl Node {
    /// Build storage, metadata and scheduler from configuration.
    pub async fn start(config: &AppConfig) -> Result<Self, AppError> {
        let storage = build_provider(&config.storage).await?;
        let revisions = build_revision_store(&config.metadata).await?;

        let (scheduler, pool): (Arc<dyn TransferScheduler>, Option<WorkerPool>) =
            match config.transfer.dispatch {
                DispatchMode::Inline => {
                    (Arc::new(InlineScheduler::new()) as Arc<dyn TransferScheduler>, None)
                }
                DispatchMode::Pooled => {
                    let pool = WorkerPool::start(&config.worker);
                    (
                        Arc::new(PooledScheduler::new(pool.clone())) as Arc<dyn TransferScheduler>,
                        Some(pool),
                    )
                }
            };

        tracing::info!(
            "Node '{}' ready (storage: {}, scheduler: {})",
            config.node.id,
            storage.provider_type(),
            scheduler.scheduler_type()
        );

        Ok(Self {
            services: Services::new(config, revisions, storage, scheduler),
            pool,
        })
    }

    /// Drain the worker pool, if any.
    pub async fn shutdown(self) {
        if let Some(pool) = self.pool {
            pool.shutdown().await;
        }
    }
}
