//! Error types for parameter bridge operations.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Errors that can occur when talking to the parameter store.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// No document is currently open in the backend.
    #[error("No document is open")]
    DocumentNotOpen,

    /// The named parameter does not exist in the document.
    #[error("Parameter not found: {name}")]
    ParameterNotFound {
        /// Parameter name that was not found.
        name: String,
    },

    /// The parameter exists but cannot be written.
    #[error("Parameter is read-only: {name}")]
    ReadOnly {
        /// Name of the read-only parameter.
        name: String,
    },

    /// Failed to read a document snapshot file.
    #[error("Failed to read snapshot: {path}")]
    SnapshotRead {
        /// Path to the snapshot file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A snapshot file did not contain valid parameter data.
    #[error("Failed to parse snapshot: {path}")]
    SnapshotParse {
        /// Path to the snapshot file.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Failed to write a document snapshot file.
    #[error("Failed to write snapshot: {path}")]
    SnapshotWrite {
        /// Path to the snapshot file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

impl BridgeError {
    /// Creates a parameter-not-found error.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::ParameterNotFound { name: name.into() }
    }

    /// Creates a read-only error.
    pub fn read_only(name: impl Into<String>) -> Self {
        Self::ReadOnly { name: name.into() }
    }

    /// Creates a snapshot read error.
    pub fn snapshot_read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::SnapshotRead {
            path: path.into(),
            source,
        }
    }

    /// Creates a snapshot write error.
    pub fn snapshot_write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::SnapshotWrite {
            path: path.into(),
            source,
        }
    }
}
