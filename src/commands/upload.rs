//! File upload CLI command.

use std::path::PathBuf;

use clap::Args;

use revstore_core::config::AppConfig;
use revstore_core::error::{AppError, ErrorKind};
use revstore_service::{LoggingListener, Services};
use revstore_storage::transfer::StreamSource;

use crate::output::{self, OutputFormat};

/// Arguments for the upload command
#[derive(Debug, Args)]
pub struct UploadArgs {
    /// Target file ID
    pub file_id: String,

    /// Path to the content to upload
    pub path: PathBuf,
}

/// Execute the upload command
pub async fn execute(
    args: &UploadArgs,
    services: &Services,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let file = tokio::fs::File::open(&args.path).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Validation,
            format!("Cannot open {}", args.path.display()),
            e,
        )
    })?;
    let size = file
        .metadata()
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Validation,
                format!("Cannot stat {}", args.path.display()),
                e,
            )
        })?
        .len();

    tracing::info!(
        "Uploading '{}' ({} bytes) into {}",
        args.path.display(),
        size,
        args.file_id
    );

    let source = StreamSource::from_reader(file, config.transfer.buffer_size_bytes);
    let descriptor = services
        .upload
        .upload_file_content(&args.file_id, size, Box::new(source), &mut LoggingListener)
        .await?;

    if format == OutputFormat::Table {
        output::print_success(&format!("Uploaded {} bytes", size));
    }
    output::print_descriptor(&descriptor, format);
    Ok(())
}
