use std::{panic::Location, path::PathBuf};

use error_location::ErrorLocation;
use thiserror::Error;

/// Capture and recording errors with source location tracking.
#[derive(Error, Debug)]
pub enum CoreError {
    /// The external video recorder refused to start.
    #[error("Video recorder failed to start: {reason} {location}")]
    RecorderStart {
        /// Description of the recorder failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The external video recorder failed while stopping.
    #[error("Video recorder failed to stop: {reason} {location}")]
    RecorderStop {
        /// Description of the recorder failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// A hotkey identifier does not name a known key.
    #[error("Unknown key identifier: {key:?} {location}")]
    UnknownKey {
        /// The identifier that failed to resolve.
        key: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The raw event source could not be opened.
    #[error("Raw event source unavailable: {reason} {location}")]
    SourceUnavailable {
        /// Description of the source failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Writing the session event log failed.
    #[error("Failed to write event log {path:?}: {reason} {location}")]
    LogWrite {
        /// Destination of the log file.
        path: PathBuf,
        /// Description of the write failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Persisting session metadata failed.
    #[error("Failed to write metadata {path:?}: {reason} {location}")]
    MetadataWrite {
        /// Destination of the metadata file.
        path: PathBuf,
        /// Description of the write failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Session directory allocation or marking failed.
    #[error("Session directory error: {reason} {location}")]
    Session {
        /// Description of the failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// IO error from filesystem operations.
    #[error("IO error: {source} {location}")]
    Io {
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// JSON serialization error.
    #[error("Serialization error: {source} {location}")]
    Serialization {
        /// The underlying serde_json error.
        #[source]
        source: serde_json::Error,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

impl From<std::io::Error> for CoreError {
    #[track_caller]
    fn from(source: std::io::Error) -> Self {
        CoreError::Io {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

impl From<serde_json::Error> for CoreError {
    #[track_caller]
    fn from(source: serde_json::Error) -> Self {
        CoreError::Serialization {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

/// Result type alias using [`CoreError`].
pub type Result<T> = std::result::Result<T, CoreError>;
