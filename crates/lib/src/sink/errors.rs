//! Error types for result sinks.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while emitting read results.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum SinkError {
    /// The output file could not be created.
    #[error("Failed to create output file {}", path.display())]
    Create {
        /// Path of the output file
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Writing or flushing a result failed.
    #[error("Failed to write results to {}", path.display())]
    Write {
        /// Path of the output file
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl SinkError {
    /// Check if this error came from the filesystem.
    pub fn is_io_error(&self) -> bool {
        matches!(self, SinkError::Create { .. } | SinkError::Write { .. })
    }

    /// Path of the output the error refers to.
    pub fn path(&self) -> &std::path::Path {
        match self {
            SinkError::Create { path, .. } | SinkError::Write { path, .. } => path,
        }
    }
}

impl From<SinkError> for crate::Error {
    fn from(err: SinkError) -> Self {
        crate::Error::Sink(err)
    }
}
