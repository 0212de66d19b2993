//! File descriptor CLI command.

use clap::Args;

use revstore_core::error::AppError;
use revstore_service::Services;

use crate::output::{self, OutputFormat};

/// Arguments for the info command
#[derive(Debug, Args)]
pub struct InfoArgs {
    /// File ID
    pub file_id: String,
}

/// Execute the info command
pub async fn execute(
    args: &InfoArgs,
    services: &Services,
    format: OutputFormat,
) -> Result<(), AppError> {
    match services
        .management
        .get_file_descriptor(&args.file_id)
        .await?
    {
        Some(descriptor) => output::print_descriptor(&descriptor, format),
        None => {
            return Err(AppError::not_found(format!(
                "File not found: {}",
                args.file_id
            )));
        }
    }
    Ok(())
}
