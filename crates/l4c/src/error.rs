//! crates/l4c/src/error.rs
//! Error type shared by every fallible runtime operation.

use std::io;
use std::path::{Path, PathBuf};

use crate::table::LoggerHandle;

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors surfaced across the runtime API.
///
/// Only context lifecycle problems cross the API boundary. I/O failures while
/// writing an already-open destination are absorbed by the writer and reported
/// through `tracing` diagnostics instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The handle does not name a live logger context.
    #[error("invalid logger handle {0}")]
    InvalidHandle(LoggerHandle),

    /// File destinations must be configured with an absolute path.
    #[error("log file path is not absolute: {}", .0.display())]
    RelativePath(PathBuf),

    /// A message id falls outside the registry of the context.
    #[error("message id {id} out of range (registry holds {capacity} messages)")]
    MessageIdOutOfRange {
        /// The rejected id.
        id: usize,
        /// Number of slots in the registry.
        capacity: usize,
    },

    /// Buffer capacities must be at least one byte.
    #[error("record buffer size must be non-zero")]
    InvalidBufferSize,

    /// Every context slot is in use.
    #[error("logger context table is full ({0} contexts)")]
    TableExhausted(usize),

    /// Another process holds the advisory lock on the log file.
    #[error("advisory lock on {} is held elsewhere", path.display())]
    LockContended {
        /// File that could not be locked.
        path: PathBuf,
    },

    /// Filesystem operation failed while opening or rotating a destination.
    #[error("failed to {action} {}: {source}", path.display())]
    Io {
        /// Short verb phrase describing the failed step.
        action: &'static str,
        /// Path the step operated on.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
}

impl Error {
    /// Creates an [`Error::Io`] with path context.
    pub fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }
}

/// Extension trait for attaching an action and path to I/O results.
pub(crate) trait IoResultExt<T> {
    /// Maps an I/O error to [`Error::Io`].
    fn or_io(self, action: &'static str, path: &Path) -> Result<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn or_io(self, action: &'static str, path: &Path) -> Result<T> {
        self.map_err(|source| Error::io(action, path, source))
    }
}
