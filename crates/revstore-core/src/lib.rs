//! # revstore-core
//!
//! Core crate for Revstore. Contains the collaborator traits (metadata
//! repository, storage backend, identifier generator), configuration
//! schemas, typed identifiers, the single-settlement [`promise`]
//! primitive, and the unified error system.
//!
//! This crate has **no** internal dependencies on other Revstore crates.

pub mod config;
pub mod error;
pub mod promise;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorClass, ErrorKind};
pub use promise::{Deferred, Promise};
pub use result::AppResult;
