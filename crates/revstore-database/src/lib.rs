//! # revstore-database
//!
//! Metadata persistence for file revisions. Repositories implement the
//! core [`Repository`](revstore_core::traits::Repository) trait over an
//! in-memory map or a directory of JSON documents.

pub mod repositories;
pub mod store;

pub use repositories::{JsonRevisionRepository, MemoryRevisionRepository};
pub use store::{RevisionStore, build_revision_store};
