//! Convenience result type alias for Revstore.

use crate::error::AppError;

/// A specialized `Result` type for Revstore operations.
pub type AppResult<T> = Result<T, AppError>;
