//! File disposal CLI command.

use clap::Args;

use revstore_core::error::AppError;
use revstore_service::Services;

use crate::output;

/// Arguments for the dispose command
#[derive(Debug, Args)]
pub struct DisposeArgs {
    /// File ID
    pub file_id: String,
}

/// Execute the dispose command
pub async fn execute(args: &DisposeArgs, services: &Services) -> Result<(), AppError> {
    services.management.dispose_file(&args.file_id).await?;
    output::print_success(&format!("Disposed {}", args.file_id));
    Ok(())
}
