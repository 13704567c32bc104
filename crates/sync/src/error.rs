use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the sync engine and the upload pipeline outside of the
/// per-request failures, which are reported through status and progress.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Invalid configuration value.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A host field or selected file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A host field is temporarily unavailable.
    #[error("field unavailable: {0}")]
    FieldUnavailable(String),
}
