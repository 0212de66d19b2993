//! Repository implementations for file revisions.

pub mod json;
pub mod memory;

pub use json::JsonRevisionRepository;
pub use memory::MemoryRevisionRepository;
