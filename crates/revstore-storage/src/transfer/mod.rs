//! Pull-based streaming transfer engine.
//!
//! The endpoint contracts ([`SourcePoint`], [`DestinationPoint`],
//! [`CompletionCallback`]) live in `revstore-core`; this module provides
//! the [`Transmitter`] that drives them, the [`TransferScheduler`] that
//! creates and dispatches transmitters, and stock endpoints.
//!
//! [`SourcePoint`]: revstore_core::traits::SourcePoint
//! [`DestinationPoint`]: revstore_core::traits::DestinationPoint
//! [`CompletionCallback`]: revstore_core::traits::CompletionCallback

pub mod callback;
pub mod destinations;
pub mod multipart;
pub mod scheduler;
pub mod sources;
pub mod transmitter;

pub use callback::{DeferredCallback, NoopCallback};
pub use destinations::{BorrowedDestination, BufferDestination, RecordedPart, WriterDestination};
pub use multipart::MultipartDestination;
pub use scheduler::{InlineScheduler, TransferScheduler};
pub use sources::{ByteStream, BytesSource, LimitedSource, StreamSource};
pub use transmitter::{TransferPhase, Transmitter};
