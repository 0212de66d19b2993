//! Shared value types.

pub mod id;
pub mod range;

pub use id::FileId;
pub use range::{ByteRange, RangeRequest, ResolvedRange};
