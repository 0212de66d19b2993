//! File download CLI command.

use std::path::PathBuf;

use clap::Args;
use tokio::io::AsyncWrite;

use revstore_core::error::{AppError, ErrorKind};
use revstore_core::traits::DestinationPoint;
use revstore_core::types::RangeRequest;
use revstore_service::{DownloadRequest, LoggingListener, Services};
use revstore_storage::transfer::{MultipartDestination, WriterDestination};

use crate::output::{self, OutputFormat};

type Sink = WriterDestination<Box<dyn AsyncWrite + Unpin + Send>>;

/// Arguments for the download command
#[derive(Debug, Args)]
pub struct DownloadArgs {
    /// File ID
    pub file_id: String,

    /// Byte ranges, e.g. `bytes=0-99,200-`
    #[arg(short, long)]
    pub range: Option<String>,

    /// Write content to this path instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Execute the download command
///
/// Requests that resolve to more than one window are written as a
/// `multipart/byteranges` body.
pub async fn execute(
    args: &DownloadArgs,
    services: &Services,
    format: OutputFormat,
) -> Result<(), AppError> {
    let writer: Box<dyn AsyncWrite + Unpin + Send> = match &args.output {
        Some(path) => Box::new(tokio::fs::File::create(path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Validation,
                format!("Cannot create {}", path.display()),
                e,
            )
        })?),
        None => Box::new(tokio::io::stdout()),
    };
    let sink: Sink = WriterDestination::new(writer);

    let framing = multipart_media_type(args, services).await;

    let mut plain;
    let mut multipart;
    let destination: &mut dyn DestinationPoint = match framing {
        Some(media_type) => {
            multipart = MultipartDestination::new(sink, media_type);
            eprintln!("Content-Type: {}", multipart.content_type());
            &mut multipart
        }
        None => {
            plain = sink;
            &mut plain
        }
    };

    let summary = services
        .download
        .download_file(
            DownloadRequest {
                file_id: &args.file_id,
                range: args.range.as_deref(),
                destination,
            },
            &mut LoggingListener,
        )
        .await?;

    output::print_download_summary(&summary, format);
    Ok(())
}

/// Media type of the parts when the request selects several windows of an
/// uploaded file. Anything that cannot be resolved here is left to the
/// download itself to report.
async fn multipart_media_type(args: &DownloadArgs, services: &Services) -> Option<String> {
    let request = RangeRequest::parse(args.range.as_deref()).ok()?;
    if request.is_full() {
        return None;
    }
    let descriptor = services
        .management
        .get_file_descriptor(&args.file_id)
        .await
        .ok()??;
    let windows = request.resolve(descriptor.total_length?).ok()?;
    (windows.len() > 1).then_some(descriptor.media_type)
}
