#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `l4c` is a small per-process logging runtime. Applications open logger
//! contexts for standard output, standard error or a rotating file, register
//! the messages they intend to emit (usually from a catalog compiled by
//! `l4cdefgen`) and then emit leveled, optionally throttled records through
//! them.
//!
//! # Design
//!
//! - [`ContextTable`] owns every [`LoggerContext`] and hands out
//!   generation-tagged [`LoggerHandle`]s. Opening the same shareable
//!   destination twice yields the same context with a higher refcount.
//! - Each context owns a [`MessageRegistry`]: message ids map to a display
//!   name, an effective [`Severity`] and an optional throttle interval.
//! - Records are rendered into a bounded [`RecordBuffer`] with the fixed
//!   prefix `<timestamp> [<pid>] <name> <SEVERITY>[<suppressed>]: ` and handed
//!   to the destination, either at once or, for
//!   [`LoggerContext::emit_buffered`], when the buffer fills or is flushed.
//! - File destinations rotate. The configured path is a symlink to a shadow
//!   file named `<path>.<epoch-seconds>`; when the shadow grows past
//!   [`FileOptions::max_size`] or ages past [`FileOptions::max_age`], a new
//!   shadow is created and the symlink is swapped atomically. Old shadows are
//!   pruned down to [`FileOptions::max_retained`].
//!
//! # Invariants
//!
//! - A record is allowed when its message is registered and the effective
//!   severity is at least as verbose as the requested one.
//! - The rollover check runs before each write, so a shadow file exceeds its
//!   size limit by at most one write, unless the limit trips again within the
//!   second its shadow is named for.
//! - Handles of closed contexts never resolve again, even after their slot is
//!   reused.
//!
//! # Errors
//!
//! Lifecycle operations return [`Error`]. Write failures on an open
//! destination are not errors: the record is dropped, a `tracing` warning is
//! emitted and the call reports [`Emission::WriteFailed`].
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//! use l4c::{ContextTable, Destination, FileOptions, Severity};
//!
//! let dir = tempfile::tempdir()?;
//! let table = ContextTable::new();
//! let handle = table.open(Destination::File(
//!     FileOptions::new(dir.path().join("app.log"))
//!         .max_size(1 << 20)
//!         .max_retained(5),
//! ))?;
//!
//! table.register_message(handle, 0, Severity::Info, "NET_UP")?;
//! table.set_throttle(handle, Some(Duration::from_secs(1)), Some("NET_"))?;
//! table.emit(handle, Severity::Info, 0, format_args!("link {} up", "eth0"))?;
//! table.close(handle)?;
//!
//! let written = std::fs::read_to_string(dir.path().join("app.log"))?;
//! assert!(written.ends_with("NET_UP INFO[0]: link eth0 up\n"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod buffer;
mod clock;
mod config;
mod context;
mod destination;
mod error;
mod global;
mod record;
mod registry;
mod rotation;
mod severity;
mod table;
mod writer;

pub use buffer::{FormatError, RecordBuffer};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{DEFAULT_BUFFER_SIZE, DEFAULT_MAX_CONTEXTS, MAX_MESSAGES, TableConfig};
pub use context::{Emission, LoggerContext, RecordStream};
pub use destination::{Destination, DestinationKind, FileOptions};
pub use error::{Error, Result};
pub use global::{global, init, init_with, shutdown};
pub use record::{RecordStyle, TimestampFormat};
pub use registry::{MessageInfo, MessageRegistry};
pub use rotation::{FileWriter, RotationState, shadow_path_for};
pub use severity::{ParseSeverityError, Severity};
pub use table::{ContextTable, LoggerHandle};
