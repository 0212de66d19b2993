//! # revstore-service
//!
//! Application services for Revstore. The [`RevisionLifecycle`] applies
//! lifecycle transitions together with their storage side effects; the
//! management, upload and download services load and save revisions
//! around it and report outcomes to caller-supplied listeners.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod context;
pub mod file;
pub mod identifier;
pub mod lifecycle;

pub use context::{RevisionStore, Services};
pub use file::{
    DownloadListener, DownloadRequest, DownloadService, DownloadSummary, LoggingListener,
    ManagementService, UploadListener, UploadService,
};
pub use identifier::NodeIdGenerator;
pub use lifecycle::{LifecycleSettings, RevisionLifecycle};
