//! crates/l4c/src/rotation.rs
//! File writer and rotation engine.
//!
//! A file destination is a pair of names:
//!
//! - the **logical path** the application configures, which is always a
//!   symlink while the destination is open, and
//! - the **shadow file** `<logical path>.<unix-epoch-seconds>` the symlink
//!   points at, which receives the bytes.
//!
//! Rollover creates a fresh shadow file, swaps the symlink atomically (a
//! temporary link renamed over the logical path) and only then retires the
//! previous descriptor. Retired shadow files stay on disk until retention
//! cleanup prunes all but the newest `max_retained`.
//!
//! # States
//!
//! ```text
//! Unopened --open--> Linked --limits exceeded--> Rolling --> Linked
//!     \                 \                          \
//!      +----------------+-------------------------+--> Failed --next write--> (open again)
//! ```
//!
//! The rollover check runs before every write, so a shadow file overshoots its
//! size limit by at most one record. The exception is a limit that trips again
//! within the epoch second the shadow is named for: the new shadow would be
//! the same file, so the writer keeps appending until the second passes.

use std::ffi::OsString;
use std::fs::{self, File, Metadata, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use fs2::FileExt;
use tracing::{debug, warn};

use crate::clock::unix_whole_seconds;
use crate::destination::FileOptions;
use crate::error::{Error, IoResultExt, Result};

/// Permission bits of newly created shadow files.
#[cfg(unix)]
const SHADOW_FILE_MODE: u32 = 0o644;

static LINK_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Lifecycle state of a [`FileWriter`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RotationState {
    /// Not opened yet, or closed.
    Unopened,
    /// The logical path links to the shadow file receiving writes.
    Linked,
    /// A rollover is in progress.
    Rolling,
    /// The last open or rollover failed; the next write retries the open.
    Failed,
}

/// Rotation bookkeeping and the open descriptor of one file destination.
#[derive(Debug)]
pub struct FileWriter {
    options: FileOptions,
    shadow: Option<PathBuf>,
    file: Option<File>,
    size: u64,
    created: SystemTime,
    state: RotationState,
}

impl FileWriter {
    /// Creates an unopened writer. Fails unless the logical path is absolute.
    pub fn new(options: FileOptions) -> Result<Self> {
        if !options.path.is_absolute() {
            return Err(Error::RelativePath(options.path));
        }
        Ok(Self {
            options,
            shadow: None,
            file: None,
            size: 0,
            created: UNIX_EPOCH,
            state: RotationState::Unopened,
        })
    }

    /// Logical path.
    pub fn path(&self) -> &Path {
        &self.options.path
    }

    /// Options the writer was created with.
    pub const fn options(&self) -> &FileOptions {
        &self.options
    }

    /// Shadow file currently receiving writes.
    pub fn shadow_path(&self) -> Option<&Path> {
        self.shadow.as_deref()
    }

    /// Bytes in the current shadow file as tracked by the writer.
    pub const fn size(&self) -> u64 {
        self.size
    }

    /// Creation time of the current shadow file.
    pub const fn created(&self) -> SystemTime {
        self.created
    }

    /// Current lifecycle state.
    pub const fn state(&self) -> RotationState {
        self.state
    }

    /// Brings the destination to [`RotationState::Linked`].
    ///
    /// An existing symlink at the logical path whose target exists is adopted
    /// together with its size, which lets a restarted process (or a second
    /// process) continue the same shadow file. Anything else at the logical
    /// path is replaced by a link to a brand-new shadow file. The rollover
    /// check runs once the descriptor is open.
    pub fn open(&mut self, now: SystemTime) -> Result<()> {
        if let Err(error) = self.bootstrap(now) {
            self.fail();
            return Err(error);
        }
        self.state = RotationState::Linked;
        self.check_rollover(now).map(|_| ())
    }

    fn bootstrap(&mut self, now: SystemTime) -> Result<()> {
        let path = self.options.path.clone();
        let adopted = match fs::symlink_metadata(&path) {
            Ok(metadata) if metadata.file_type().is_symlink() => self.adopt(&path, now)?,
            Ok(_) => false,
            Err(error) if error.kind() == io::ErrorKind::NotFound => false,
            Err(error) => return Err(Error::io("inspect log path", path, error)),
        };

        let file = match self.shadow.clone() {
            Some(shadow) if adopted => {
                let file = open_append(&shadow).or_io("open shadow file", &shadow)?;
                self.lock(&file, &shadow)?;
                debug!(target: "l4c::rotation", path = %path.display(), shadow = %shadow.display(), size = self.size, "adopted shadow file");
                file
            }
            _ => self.new_shadow(now)?,
        };
        self.file = Some(file);
        Ok(())
    }

    /// Reads the symlink at `path` and records its target as the current
    /// shadow when the target is an existing regular file.
    fn adopt(&mut self, path: &Path, now: SystemTime) -> Result<bool> {
        let target = fs::read_link(path).or_io("read log symlink", path)?;
        let shadow = match path.parent() {
            Some(dir) if target.is_relative() => dir.join(&target),
            _ => target,
        };
        match fs::metadata(&shadow) {
            Ok(metadata) if metadata.is_file() => {
                self.size = metadata.len();
                self.created = shadow_created(&shadow, &metadata).unwrap_or(now);
                self.shadow = Some(shadow);
                Ok(true)
            }
            Ok(_) => Ok(false),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(error) => Err(Error::io("stat shadow file", shadow, error)),
        }
    }

    /// Creates the shadow file for `now`, links the logical path to it and
    /// prunes old shadows. Returns the open (and, if requested, locked)
    /// descriptor of the new shadow.
    fn new_shadow(&mut self, now: SystemTime) -> Result<File> {
        let shadow = shadow_path_for(&self.options.path, now);
        let file = open_append(&shadow).or_io("create shadow file", &shadow)?;
        self.lock(&file, &shadow)?;
        let metadata = file.metadata().or_io("stat shadow file", &shadow)?;
        install_link(&shadow, &self.options.path)?;

        debug!(target: "l4c::rotation", path = %self.options.path.display(), shadow = %shadow.display(), "linked new shadow file");
        self.size = metadata.len();
        self.created = now;
        self.shadow = Some(shadow);
        self.cleanup_shadows();
        Ok(file)
    }

    fn lock(&self, file: &File, path: &Path) -> Result<()> {
        if !self.options.flock {
            return Ok(());
        }
        file.try_lock_exclusive().map_err(|error| {
            if error.kind() == fs2::lock_contended_error().kind() {
                Error::LockContended {
                    path: path.to_path_buf(),
                }
            } else {
                Error::io("lock log file", path, error)
            }
        })
    }

    /// Whether the size or age limit has been exceeded at `now`.
    pub fn limits_exceeded(&self, now: SystemTime) -> bool {
        let max_age = self.options.max_age;
        let too_old = !max_age.is_zero()
            && now
                .duration_since(self.created)
                .is_ok_and(|age| age > max_age);
        let too_big = self.options.max_size > 0 && self.size > self.options.max_size;
        too_old || too_big
    }

    /// Rolls over when a limit is exceeded, returning whether it did.
    ///
    /// The new shadow is linked before the previous descriptor is closed, so
    /// the logical path never dangles. A rollover within the second the
    /// current shadow was named for is skipped: the new shadow would be the
    /// same file.
    pub fn check_rollover(&mut self, now: SystemTime) -> Result<bool> {
        if !self.limits_exceeded(now) {
            return Ok(false);
        }
        if self.shadow.as_deref() == Some(shadow_path_for(&self.options.path, now).as_path()) {
            return Ok(false);
        }

        self.state = RotationState::Rolling;
        let retired = self.shadow.clone();
        match self.new_shadow(now) {
            Ok(file) => {
                self.file = Some(file);
                self.state = RotationState::Linked;
                debug!(
                    target: "l4c::rotation",
                    path = %self.options.path.display(),
                    retired = ?retired,
                    "rolled over"
                );
                Ok(true)
            }
            Err(error) => {
                self.fail();
                Err(error)
            }
        }
    }

    /// Appends `bytes`, rolling over first if a limit is exceeded.
    ///
    /// Returns `Ok(false)` when the bytes were dropped because the write
    /// itself failed; that failure is reported through diagnostics only. Open
    /// and rollover failures are returned as errors.
    pub fn write(&mut self, bytes: &[u8], now: SystemTime) -> Result<bool> {
        if self.file.is_none() {
            self.open(now)?;
        } else {
            self.check_rollover(now)?;
        }

        let Some(file) = self.file.as_mut() else {
            return Ok(false);
        };
        match file.write_all(bytes) {
            Ok(()) => {
                self.size += bytes.len() as u64;
                Ok(true)
            }
            Err(error) => {
                warn!(target: "l4c::rotation", path = %self.options.path.display(), %error, "write failed, record dropped");
                if let Ok(metadata) = file.metadata() {
                    self.size = metadata.len();
                }
                Ok(false)
            }
        }
    }

    /// Releases the descriptor. The logical link and shadow files stay.
    pub fn close(&mut self) {
        self.file = None;
        self.state = RotationState::Unopened;
    }

    fn fail(&mut self) {
        self.file = None;
        self.state = RotationState::Failed;
    }

    /// Unlinks all but the newest `max_retained` shadow files of this path.
    fn cleanup_shadows(&self) {
        let keep = self.options.max_retained;
        if keep == 0 {
            return;
        }
        let path = &self.options.path;
        let (Some(dir), Some(base)) = (path.parent(), path.file_name()) else {
            return;
        };

        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(error) => {
                warn!(target: "l4c::rotation", dir = %dir.display(), %error, "cannot list shadow files");
                return;
            }
        };
        let base = base.as_encoded_bytes();
        let mut shadows: Vec<(u64, PathBuf)> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let stamp = shadow_suffix(base, entry.file_name().as_encoded_bytes())?;
                Some((stamp, entry.path()))
            })
            .collect();

        if shadows.len() <= keep {
            return;
        }
        shadows.sort();
        let excess = shadows.len() - keep;
        for (_, stale) in shadows.drain(..excess) {
            match fs::remove_file(&stale) {
                Ok(()) => debug!(target: "l4c::rotation", shadow = %stale.display(), "pruned shadow file"),
                Err(error) => {
                    warn!(target: "l4c::rotation", shadow = %stale.display(), %error, "cannot prune shadow file");
                }
            }
        }
    }
}

/// `<path>.<unix-epoch-seconds>` for `at`.
pub fn shadow_path_for(path: &Path, at: SystemTime) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(format!(".{}", unix_whole_seconds(at)));
    PathBuf::from(name)
}

/// Epoch-seconds suffix of `name` when it is a shadow of the file named `base`.
fn shadow_suffix(base: &[u8], name: &[u8]) -> Option<u64> {
    let digits = name.strip_prefix(base)?.strip_prefix(b".")?;
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }
    std::str::from_utf8(digits).ok()?.parse().ok()
}

/// Creation time of an adopted shadow: its name suffix, else file metadata.
fn shadow_created(shadow: &Path, metadata: &Metadata) -> Option<SystemTime> {
    let name = shadow.file_name()?.as_encoded_bytes();
    let stamp = name
        .iter()
        .rposition(|&byte| byte == b'.')
        .and_then(|dot| {
            let digits = &name[dot + 1..];
            (!digits.is_empty() && digits.iter().all(u8::is_ascii_digit))
                .then(|| std::str::from_utf8(digits).ok()?.parse::<u64>().ok())
                .flatten()
        });
    match stamp {
        Some(secs) => Some(UNIX_EPOCH + Duration::from_secs(secs)),
        None => metadata.created().or_else(|_| metadata.modified()).ok(),
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.create(true).append(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(SHADOW_FILE_MODE);
    }
    options.open(path)
}

/// Atomically points `link` at `target`, replacing whatever entry `link` was.
fn install_link(target: &Path, link: &Path) -> Result<()> {
    let mut staging = OsString::from(link.as_os_str());
    staging.push(format!(
        ".link-{}-{}",
        std::process::id(),
        LINK_COUNTER.fetch_add(1, Ordering::Relaxed)
    ));
    let staging = PathBuf::from(staging);

    let _ = fs::remove_file(&staging);
    make_symlink(target, &staging).or_io("create symlink", &staging)?;
    if let Err(error) = fs::rename(&staging, link) {
        let _ = fs::remove_file(&staging);
        return Err(Error::io("install symlink", link, error));
    }
    Ok(())
}

#[cfg(unix)]
fn make_symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn make_symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(target, link)
}
