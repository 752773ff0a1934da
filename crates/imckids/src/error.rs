//! Error types for imckids.
//!
//! This module defines all error types used throughout the imckids crate,
//! separating caller errors (bad measurements, unsupported cohorts) from
//! storage and configuration failures.

use std::path::PathBuf;
use thiserror::Error;

use crate::classify::Sex;

/// The main error type for imckids operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Caller Errors ===
    /// No percentile row exists for the given age and sex.
    #[error("unsupported cohort: no percentile table for age {age} ({sex})")]
    UnsupportedCohort {
        /// The requested age in years.
        age: u8,
        /// The requested sex.
        sex: Sex,
    },

    /// A measurement is non-positive or outside the accepted range.
    #[error("invalid measurement: {field} = {value}")]
    InvalidMeasurement {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value, as entered.
        value: String,
    },

    // === Storage Errors ===
    /// The record log exists but could not be read or written.
    #[error("record log unavailable at {path}: {source}")]
    StorageUnavailable {
        /// Path to the record log.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A row of the record log could not be parsed.
    #[error("malformed record on line {line}: {message}")]
    MalformedRecord {
        /// 1-based line number in the log.
        line: u64,
        /// Description of what went wrong.
        message: String,
    },

    /// Bulk clear left one or more resources behind.
    #[error("clear incomplete: {}", format_failures(.failures))]
    ClearIncomplete {
        /// Each resource that could not be removed, with the reason.
        failures: Vec<(PathBuf, String)>,
    },

    /// A certificate document could not be written.
    #[error("failed to write certificate {path}: {source}")]
    Certificate {
        /// Path of the certificate file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// CSV encoding failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// PDF document assembly failed.
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
}

/// A specialized Result type for imckids operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

fn format_failures(failures: &[(PathBuf, String)]) -> String {
    failures
        .iter()
        .map(|(path, reason)| format!("{} ({reason})", path.display()))
        .collect::<Vec<_>>()
        .join(", ")
}

impl Error {
    /// Create an invalid measurement error.
    #[must_use]
    pub fn invalid_measurement(field: &'static str, value: impl ToString) -> Self {
        Self::InvalidMeasurement {
            field,
            value: value.to_string(),
        }
    }

    /// Create a malformed record error.
    #[must_use]
    pub fn malformed(line: u64, message: impl Into<String>) -> Self {
        Self::MalformedRecord {
            line,
            message: message.into(),
        }
    }

    /// Check if this error was caused by invalid input from the caller.
    ///
    /// Caller errors are surfaced as user-facing messages and never retried.
    #[must_use]
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedCohort { .. } | Self::InvalidMeasurement { .. }
        )
    }

    /// Check if this error concerns the persisted record log.
    #[must_use]
    pub fn is_storage_error(&self) -> bool {
        matches!(
            self,
            Self::StorageUnavailable { .. }
                | Self::MalformedRecord { .. }
                | Self::ClearIncomplete { .. }
                | Self::Csv(_)
        )
    }
}
