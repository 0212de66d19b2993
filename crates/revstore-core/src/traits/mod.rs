//! Core traits defined in `revstore-core` and implemented by other crates.

pub mod id_generator;
pub mod repository;
pub mod storage;
pub mod transfer;

pub use id_generator::IdGenerator;
pub use repository::Repository;
pub use storage::StorageProvider;
pub use transfer::{CompletionCallback, DestinationPoint, PartInfo, SourcePoint, TransferSummary};
