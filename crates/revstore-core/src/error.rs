//! Unified application error types for Revstore.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the `?` operator. Every [`ErrorKind`] belongs to one
//! [`ErrorClass`], which tells the caller how to dispose of the failure.

use std::fmt;
use thiserror::Error;

/// How a failure should be treated by the code that receives it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorClass {
    /// Expected, client-caused failure. Reported, never retried.
    Business,
    /// Environment or infrastructure failure (storage I/O, collaborators).
    Incident,
    /// A broken engine invariant. Not meant to be handled by callers.
    Fatal,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Business => write!(f, "business"),
            Self::Incident => write!(f, "incident"),
            Self::Fatal => write!(f, "fatal"),
        }
    }
}

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// No file revision exists for the requested identifier.
    FileNotFound,
    /// The revision already holds uploaded content.
    AlreadyUploaded,
    /// The revision has no content yet.
    NotUploaded,
    /// The revision has been disposed.
    Disposed,
    /// An identifier was required but missing or blank.
    UnspecifiedIdentifier,
    /// The range specification is malformed or selects no bytes.
    UnsatisfiableRange,
    /// Input validation failed.
    Validation,
    /// Moving bytes between a source and a destination failed.
    DataTransfer,
    /// A storage backend operation failed.
    Storage,
    /// A metadata repository operation failed.
    Database,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An unexpected internal error occurred.
    Internal,
    /// An invariant the engine relies on did not hold.
    Fatal,
}

impl ErrorKind {
    /// Return the class this kind belongs to.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::FileNotFound
            | Self::AlreadyUploaded
            | Self::NotUploaded
            | Self::Disposed
            | Self::UnspecifiedIdentifier
            | Self::UnsatisfiableRange
            | Self::Validation => ErrorClass::Business,
            Self::DataTransfer
            | Self::Storage
            | Self::Database
            | Self::Configuration
            | Self::Serialization
            | Self::Internal => ErrorClass::Incident,
            Self::Fatal => ErrorClass::Fatal,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FileNotFound => write!(f, "FILE_NOT_FOUND"),
            Self::AlreadyUploaded => write!(f, "ALREADY_UPLOADED"),
            Self::NotUploaded => write!(f, "NOT_UPLOADED"),
            Self::Disposed => write!(f, "DISPOSED"),
            Self::UnspecifiedIdentifier => write!(f, "UNSPECIFIED_IDENTIFIER"),
            Self::UnsatisfiableRange => write!(f, "UNSATISFIABLE_RANGE"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::DataTransfer => write!(f, "DATA_TRANSFER"),
            Self::Storage => write!(f, "STORAGE"),
            Self::Database => write!(f, "DATABASE"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Internal => write!(f, "INTERNAL"),
            Self::Fatal => write!(f, "FATAL"),
        }
    }
}

/// The unified application error used throughout Revstore.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// The class of this error.
    pub fn class(&self) -> ErrorClass {
        self.kind.class()
    }

    /// Whether this is an expected, client-caused failure.
    pub fn is_business(&self) -> bool {
        self.class() == ErrorClass::Business
    }

    /// Whether this is an infrastructure failure.
    pub fn is_incident(&self) -> bool {
        self.class() == ErrorClass::Incident
    }

    /// Whether this signals a broken engine invariant.
    pub fn is_fatal(&self) -> bool {
        self.class() == ErrorClass::Fatal
    }

    /// Create a file-not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::FileNotFound, message)
    }

    /// Create an already-uploaded error.
    pub fn already_uploaded(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AlreadyUploaded, message)
    }

    /// Create a content-not-uploaded error.
    pub fn not_uploaded(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotUploaded, message)
    }

    /// Create a file-disposed error.
    pub fn disposed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Disposed, message)
    }

    /// Create an unspecified-identifier error.
    pub fn unspecified_identifier(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnspecifiedIdentifier, message)
    }

    /// Create an unsatisfiable-range error.
    pub fn unsatisfiable_range(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnsatisfiableRange, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a data-transfer error.
    pub fn data_transfer(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DataTransfer, message)
    }

    /// Create a storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Storage, message)
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Create a fatal error for a broken engine invariant.
    pub fn fatal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Fatal, message)
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorKind::Storage, format!("I/O error: {err}"), err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}
