//! Error types for audit operations.
//!
//! This module defines [`AuditError`], the error type for the few paths
//! that are allowed to abort a run, and a [`Result`] type alias.
//!
//! # Error Handling Strategy
//!
//! - Probe failures are never errors: they travel as
//!   [`ProbeResult`](crate::probe::ProbeResult) values and end up as
//!   FAIL/WARN entries in the report
//! - `AuditError` covers configuration loading and report writing
//! - Use `anyhow::Error` (via `AuditError::Other`) with context for
//!   anything else, such as a closed stdout

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for audit operations.
#[derive(Debug, Error)]
pub enum AuditError {
    /// Configuration file not found at the given location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// A report file or its directory could not be written.
    #[error("Failed to write report {path}: {source}")]
    ReportWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for audit operations.
pub type Result<T> = std::result::Result<T, AuditError>;
