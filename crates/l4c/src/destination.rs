//! crates/l4c/src/destination.rs
//! Destination specifications accepted by [`ContextTable::open`](crate::ContextTable::open).

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Where a logger context sends its records.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Destination {
    /// The process's standard output. Always shared between openers.
    Stdout,
    /// The process's standard error. Always shared between openers.
    Stderr,
    /// A rotating file reached through a symlink at [`FileOptions::path`].
    File(FileOptions),
}

impl Destination {
    /// Shorthand for `Destination::File(FileOptions::new(path))`.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(FileOptions::new(path))
    }

    /// Kind tag of the destination.
    pub const fn kind(&self) -> DestinationKind {
        match self {
            Self::Stdout => DestinationKind::Stdout,
            Self::Stderr => DestinationKind::Stderr,
            Self::File(_) => DestinationKind::File,
        }
    }

    /// Whether `open` may hand out an existing context for this destination.
    pub const fn is_shareable(&self) -> bool {
        match self {
            Self::Stdout | Self::Stderr => true,
            Self::File(options) => options.shared,
        }
    }
}

/// Kind tag stored in each context and compared during reuse lookups.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum DestinationKind {
    /// Standard output.
    Stdout,
    /// Standard error.
    Stderr,
    /// Rotating file.
    File,
}

/// Rotation and sharing parameters of a file destination.
///
/// Zero values mean "unlimited" for every limit. The builder methods follow
/// the order of the on-open parameters: size, age, retention, then flags.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use l4c::FileOptions;
///
/// let options = FileOptions::new("/var/log/app.log")
///     .max_size(16 * 1024 * 1024)
///     .max_age(Duration::from_secs(3600))
///     .max_retained(10)
///     .flock(true);
/// assert!(options.flock);
/// assert!(!options.shared);
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FileOptions {
    /// Logical path; must be absolute. Always a symlink to the current shadow file.
    pub path: PathBuf,
    /// Roll over once the shadow file grows past this many bytes.
    #[cfg_attr(feature = "serde", serde(default))]
    pub max_size: u64,
    /// Roll over once the shadow file is older than this.
    #[cfg_attr(feature = "serde", serde(default))]
    pub max_age: Duration,
    /// Number of shadow files kept on disk, the current one included.
    #[cfg_attr(feature = "serde", serde(default))]
    pub max_retained: usize,
    /// Take a non-blocking exclusive advisory lock on the log file.
    #[cfg_attr(feature = "serde", serde(default))]
    pub flock: bool,
    /// Let later `open` calls for the same path reuse this context.
    #[cfg_attr(feature = "serde", serde(default))]
    pub shared: bool,
}

impl FileOptions {
    /// Options for `path` with no limits, no locking and no sharing.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_size: 0,
            max_age: Duration::ZERO,
            max_retained: 0,
            flock: false,
            shared: false,
        }
    }

    /// Sets the size limit in bytes (`0` = unlimited).
    pub fn max_size(mut self, bytes: u64) -> Self {
        self.max_size = bytes;
        self
    }

    /// Sets the age limit ([`Duration::ZERO`] = unlimited).
    pub fn max_age(mut self, age: Duration) -> Self {
        self.max_age = age;
        self
    }

    /// Sets how many shadow files survive cleanup (`0` = keep all).
    pub fn max_retained(mut self, count: usize) -> Self {
        self.max_retained = count;
        self
    }

    /// Requests the exclusive advisory lock.
    pub fn flock(mut self, flock: bool) -> Self {
        self.flock = flock;
        self
    }

    /// Marks the destination as shareable between openers.
    pub fn shared(mut self, shared: bool) -> Self {
        self.shared = shared;
        self
    }

    /// Logical path of the destination.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
