//! # revstore-entity
//!
//! Domain entity models for Revstore. The [`revision::FileRevision`]
//! aggregate carries a file's identity, metadata, and lifecycle state; its
//! state only changes through the transition function in
//! [`revision::state`].

pub mod revision;

pub use revision::{
    ContentDisposition, FileDescriptor, FileRevision, FileState, LifecycleError, LifecycleEvent,
    RevisionAttributes, RevisionRepository,
};
