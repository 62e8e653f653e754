//! Error types for the JetSim evaluation pipeline.
//!
//! This module defines the error hierarchy for every stage of an evaluation:
//! configuration (metadata, dataset selection), integrity (checksums),
//! preconditions (download/load ordering), transport (network fetches),
//! storage (files and containers) and metric computation.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level evaluation error type
///
/// Every fallible operation in the pipeline returns this error. None of the
/// variants are retried internally; the orchestrator decides per unit whether
/// to continue.
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    /// Configuration errors (metadata, dataset selection)
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Integrity errors (checksum mismatch)
    #[error("Integrity error: {0}")]
    Integrity(#[from] IntegrityError),

    /// Operation invoked before its inputs were ready
    #[error("Precondition failed: {0}")]
    Precondition(#[from] PreconditionError),

    /// Network fetch failures
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Filesystem and container format failures
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Metric inputs with unusable shapes or sizes
    #[error("Metric error: {0}")]
    Metric(String),
}

impl EvalError {
    /// Get the error code for this error
    ///
    /// Error codes are stable and end up in persisted reports.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration(e) => match e {
                ConfigurationError::MetadataNotFound(_) => "METADATA_NOT_FOUND",
                ConfigurationError::InvalidMetadata { .. } => "INVALID_METADATA",
                ConfigurationError::UnsupportedDataset(_) => "UNSUPPORTED_DATASET",
                ConfigurationError::UnsupportedDataClass { .. } => "UNSUPPORTED_DATA_CLASS",
                ConfigurationError::UnknownFeature { .. } => "UNKNOWN_FEATURE",
                ConfigurationError::MissingDownloadUrl { .. } => "MISSING_DOWNLOAD_URL",
                ConfigurationError::DuplicateSubmission { .. } => "DUPLICATE_SUBMISSION",
            },
            Self::Integrity(_) => "CHECKSUM_MISMATCH",
            Self::Precondition(e) => match e {
                PreconditionError::NotDownloaded(_) => "NOT_DOWNLOADED",
                PreconditionError::SamplesNotLoaded { .. } => "SAMPLES_NOT_LOADED",
            },
            Self::Transport(_) => "TRANSPORT_ERROR",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::Metric(_) => "METRIC_ERROR",
        }
    }

    /// Get the broad category of this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Configuration(_) => ErrorCategory::Configuration,
            Self::Integrity(_) => ErrorCategory::Integrity,
            Self::Precondition(_) => ErrorCategory::Precondition,
            Self::Transport(_) => ErrorCategory::Transport,
            Self::Storage(_) => ErrorCategory::Storage,
            Self::Metric(_) => ErrorCategory::Metric,
        }
    }

    /// Shorthand for a metric error
    pub fn metric(message: impl Into<String>) -> Self {
        Self::Metric(message.into())
    }
}

/// Broad error classes, as recorded in reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Configuration,
    Integrity,
    Precondition,
    Transport,
    Storage,
    Metric,
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    /// Submission metadata file is missing
    #[error("Metadata file not found: {}", .0.display())]
    MetadataNotFound(PathBuf),

    /// Submission metadata could not be parsed
    #[error("Invalid metadata in {}: {message}", .path.display())]
    InvalidMetadata { path: PathBuf, message: String },

    /// Dataset is not registered
    #[error("Invalid dataset: {0}")]
    UnsupportedDataset(String),

    /// Data class is not supported by the dataset
    #[error("Invalid data class {data_class} for dataset {dataset}")]
    UnsupportedDataClass { dataset: String, data_class: String },

    /// Requested particle feature is not provided by the dataset
    #[error("Unknown particle feature {feature} for dataset {dataset}")]
    UnknownFeature { dataset: String, feature: String },

    /// Two submission directories declare the same name
    #[error("Submission name {name} is already declared by {first}")]
    DuplicateSubmission { name: String, first: String },

    /// A fetch is required but no URL was declared
    #[error("No download URL declared for {dataset}/{data_class}")]
    MissingDownloadUrl { dataset: String, data_class: String },
}

/// Integrity errors
#[derive(Debug, thiserror::Error)]
pub enum IntegrityError {
    /// File digest does not match the declared checksum
    #[error("Downloaded file {} {algorithm} does not match expected {algorithm}: expected {expected}, got {actual}", .path.display())]
    ChecksumMismatch {
        path: PathBuf,
        algorithm: String,
        expected: String,
        actual: String,
    },
}

/// Precondition errors
#[derive(Debug, thiserror::Error)]
pub enum PreconditionError {
    /// Samples must be downloaded before loading
    #[error("Samples need to be downloaded before loading: {}", .0.display())]
    NotDownloaded(PathBuf),

    /// Samples must be loaded before deriving features
    #[error("Samples need to be loaded before calculating EFPs: {dataset}/{data_class}")]
    SamplesNotLoaded { dataset: String, data_class: String },
}

/// Transport errors
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Request could not be sent or the body could not be read
    #[error("Request to {url} failed: {message}")]
    Request { url: String, message: String },

    /// Server answered with a non-success status
    #[error("Request to {url} returned status {status}")]
    Status { url: String, status: u16 },
}

/// Storage errors
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Filesystem operation failed
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File exists but its content is not what was expected
    #[error("Unreadable container {}: {message}", .path.display())]
    Format { path: PathBuf, message: String },
}

impl StorageError {
    /// Wrap an I/O error with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Build a format error
    pub fn format(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Format {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

/// Pipeline-wide result type
pub type EvalResult<T> = Result<T, EvalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err: EvalError =
            ConfigurationError::MetadataNotFound(PathBuf::from("subs/a/metadata.yml")).into();
        assert_eq!(err.error_code(), "METADATA_NOT_FOUND");
        assert_eq!(err.category(), ErrorCategory::Configuration);

        let err: EvalError = PreconditionError::NotDownloaded(PathBuf::from("x.hdf5")).into();
        assert_eq!(err.error_code(), "NOT_DOWNLOADED");
        assert_eq!(err.category(), ErrorCategory::Precondition);
    }

    #[test]
    fn test_not_found_message_names_path() {
        let err: EvalError =
            ConfigurationError::MetadataNotFound(PathBuf::from("subs/a/metadata.yml")).into();
        assert!(err.to_string().contains("subs/a/metadata.yml"));
    }

    #[test]
    fn test_checksum_mismatch_message() {
        let err = IntegrityError::ChecksumMismatch {
            path: PathBuf::from("g30.hdf5"),
            algorithm: "md5".to_string(),
            expected: "abc".to_string(),
            actual: "def".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("expected abc"));
        assert!(msg.contains("got def"));
    }

    #[test]
    fn test_category_serialization() {
        let json = serde_json::to_string(&ErrorCategory::Integrity).unwrap();
        assert_eq!(json, "\"integrity\"");
    }
}
