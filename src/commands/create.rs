//! File creation CLI command.

use clap::Args;

use revstore_core::error::AppError;
use revstore_entity::revision::{ContentDisposition, RevisionAttributes};
use revstore_service::Services;

use crate::output::{self, OutputFormat};

/// Arguments for the create command
#[derive(Debug, Args)]
pub struct CreateArgs {
    /// File name
    pub name: String,

    /// Media type served as Content-Type
    #[arg(short, long, default_value = "application/octet-stream")]
    pub media_type: String,

    /// Serve as an attachment rather than inline
    #[arg(short, long)]
    pub attachment: bool,
}

/// Execute the create command
pub async fn execute(
    args: &CreateArgs,
    services: &Services,
    format: OutputFormat,
) -> Result<(), AppError> {
    let disposition = if args.attachment {
        ContentDisposition::Attachment
    } else {
        ContentDisposition::Inline
    };
    let attributes = RevisionAttributes::named(&args.name)
        .with_media_type(&args.media_type)
        .with_disposition(disposition);

    let file_id = services.management.create_file_revision(attributes).await?;

    match format {
        OutputFormat::Table => {
            output::print_success(&format!("Created file '{}'", args.name));
            output::print_kv("File ID", file_id.as_str());
        }
        OutputFormat::Json => output::print_json(&serde_json::json!({ "file_id": file_id })),
    }
    Ok(())
}
