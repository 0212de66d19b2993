//! File revision domain entities.

pub mod descriptor;
pub mod model;
pub mod state;

pub use descriptor::FileDescriptor;
pub use model::{ContentDisposition, FileRevision, RevisionAttributes};
pub use state::{FileState, LifecycleError, LifecycleEvent};

use revstore_core::traits::Repository;
use revstore_core::types::FileId;

/// Metadata repository for file revisions.
pub type RevisionRepository = dyn Repository<FileRevision, FileId>;
