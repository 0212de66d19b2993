//! Table and JSON output formatting for CLI commands.

use serde::Serialize;
use tabled::{Table, Tabled};

use revstore_entity::revision::FileDescriptor;
use revstore_service::DownloadSummary;

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
}

/// One row of a file descriptor table
#[derive(Debug, Tabled)]
struct DescriptorRow {
    #[tabled(rename = "File ID")]
    file_id: String,
    #[tabled(rename = "Name")]
    file_name: String,
    #[tabled(rename = "Media type")]
    media_type: String,
    #[tabled(rename = "Disposition")]
    disposition: String,
    #[tabled(rename = "Length")]
    length: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Updated")]
    updated_at: String,
}

impl From<&FileDescriptor> for DescriptorRow {
    fn from(d: &FileDescriptor) -> Self {
        Self {
            file_id: d.file_id.to_string(),
            file_name: d.file_name.clone(),
            media_type: d.media_type.clone(),
            disposition: d.content_disposition.as_str().to_string(),
            length: d
                .total_length
                .map(|len| len.to_string())
                .unwrap_or_else(|| "-".to_string()),
            state: d.state.to_string(),
            updated_at: d.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

/// One row of a download summary table
#[derive(Debug, Tabled)]
struct RangeRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Content-Range")]
    content_range: String,
    #[tabled(rename = "Bytes")]
    bytes: u64,
}

/// Print a file descriptor in the selected format
pub fn print_descriptor(descriptor: &FileDescriptor, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            let table = Table::new([DescriptorRow::from(descriptor)]).to_string();
            println!("{}", table);
        }
        OutputFormat::Json => print_json(descriptor),
    }
}

/// Print a download summary. Always goes to stderr: stdout may carry the
/// content itself.
pub fn print_download_summary(summary: &DownloadSummary, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            let rows: Vec<RangeRow> = summary
                .ranges
                .iter()
                .enumerate()
                .map(|(index, range)| RangeRow {
                    index,
                    content_range: range.content_range(summary.total_length),
                    bytes: range.count,
                })
                .collect();
            eprintln!("{}", Table::new(rows));
            eprintln!(
                "  {} bytes in {} chunks from {}",
                summary.bytes, summary.chunks, summary.file_id
            );
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(summary).unwrap_or_else(|_| "{}".to_string());
            eprintln!("{}", json);
        }
    }
}

/// Print any serializable item as pretty JSON
pub fn print_json<T: Serialize>(item: &T) {
    let json = serde_json::to_string_pretty(item).unwrap_or_else(|_| "{}".to_string());
    println!("{}", json);
}

/// Print a success message
pub fn print_success(msg: &str) {
    println!("✓ {}", msg);
}

/// Print an error message
pub fn print_error(msg: &str) {
    eprintln!("✗ {}", msg);
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:<24} {}", format!("{}:", key), value);
}
