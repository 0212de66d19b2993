//! # revstore-storage
//!
//! The streaming transfer engine and the storage provider implementations
//! for Revstore. A [`transfer::Transmitter`] drives one source/destination
//! pair to completion; providers hand out sources and destinations bound
//! to a blob on the local filesystem or in memory.

pub mod providers;
pub mod transfer;

pub use providers::{LocalStorageProvider, MemoryStorageProvider, build_provider};
pub use transfer::{InlineScheduler, TransferScheduler, Transmitter};
