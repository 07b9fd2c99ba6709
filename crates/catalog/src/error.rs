//! crates/catalog/src/error.rs
//! Errors raised while reading catalogs and writing generated sources.

use std::io;
use std::path::PathBuf;

/// Result alias for catalog operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failure reading a catalog or writing generated output.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A catalog file could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Read {
        /// Catalog path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// An output file could not be created or written.
    #[error("cannot write {}: {source}", path.display())]
    Write {
        /// Output path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

impl Error {
    /// Path the failed operation referred to.
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Read { path, .. } | Self::Write { path, .. } => path,
        }
    }
}
