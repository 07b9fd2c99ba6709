//! crates/l4c/src/context.rs
//! Logger contexts: one destination, its record buffer and its message registry.
//!
//! A [`LoggerContext`] serializes everything that touches its destination
//! behind a single mutex. The gate check, record formatting, the rollover
//! check and the write itself all run while that lock is held, so records
//! from concurrent threads never interleave within a line.
//!
//! Contexts are created and owned by a [`ContextTable`](crate::ContextTable);
//! callers borrow them through [`ContextTable::get`](crate::ContextTable::get)
//! for the duration of a call.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, SystemTime};

use tracing::warn;

use crate::buffer::{FormatError, RecordBuffer};
use crate::clock::Clock;
use crate::config::TableConfig;
use crate::destination::{Destination, DestinationKind};
use crate::error::{Error, Result};
use crate::record::{RecordHeader, RecordStyle};
use crate::registry::{Admission, MessageInfo, MessageRegistry};
use crate::rotation::{FileWriter, RotationState};
use crate::severity::Severity;
use crate::writer::Writer;

/// Outcome of one emission attempt.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Emission {
    /// The record reached the destination.
    Written {
        /// Record length including the trailing newline.
        bytes: usize,
    },
    /// The record is pending in the buffer until it fills or is flushed.
    Buffered {
        /// Record length including the trailing newline.
        bytes: usize,
    },
    /// The message is unregistered or its level excludes the severity.
    Filtered,
    /// Dropped by the throttle; counted toward the next emission.
    Throttled,
    /// The record did not fit the buffer capacity and was discarded.
    Overflow,
    /// A `Display` implementation in the arguments failed; record discarded.
    FormatFailed,
    /// The destination rejected the bytes; record dropped.
    WriteFailed,
    /// The context has been torn down.
    Closed,
}

impl Emission {
    /// Whether the record reached the destination.
    pub const fn is_written(self) -> bool {
        matches!(self, Self::Written { .. })
    }

    /// Whether the record was written or is pending in the buffer.
    pub const fn is_accepted(self) -> bool {
        matches!(self, Self::Written { .. } | Self::Buffered { .. })
    }
}

impl From<FormatError> for Emission {
    fn from(error: FormatError) -> Self {
        match error {
            FormatError::Overflow { .. } => Self::Overflow,
            FormatError::Fmt => Self::FormatFailed,
        }
    }
}

#[derive(Debug)]
struct ContextState {
    buffer: RecordBuffer,
    writer: Option<Writer>,
    registry: MessageRegistry,
}

impl ContextState {
    /// Hands every pending byte to the writer and rewinds the buffer.
    fn write_out(&mut self, now: SystemTime) -> Result<bool> {
        if self.buffer.is_empty() {
            return Ok(true);
        }
        let result = match self.writer.as_mut() {
            Some(writer) => writer.write(self.buffer.as_bytes(), now),
            None => Ok(false),
        };
        self.buffer.rewind();
        result
    }
}

/// A destination together with its buffer and message registry.
#[derive(Debug)]
pub struct LoggerContext {
    kind: DestinationKind,
    path: Option<PathBuf>,
    shared: bool,
    pid: u32,
    clock: Arc<dyn Clock>,
    state: Mutex<ContextState>,
}

impl LoggerContext {
    pub(crate) fn open(
        destination: Destination,
        config: &TableConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let kind = destination.kind();
        let shared = destination.is_shareable();
        let path = match &destination {
            Destination::File(options) => Some(normalize(options.path())),
            Destination::Stdout | Destination::Stderr => None,
        };
        let writer = Writer::open(destination, clock.now())?;
        Ok(Self {
            kind,
            path,
            shared,
            pid: std::process::id(),
            clock,
            state: Mutex::new(ContextState {
                buffer: RecordBuffer::with_capacity(config.buffer_size),
                writer: Some(writer),
                registry: MessageRegistry::new(config.max_messages),
            }),
        })
    }

    fn lock(&self) -> MutexGuard<'_, ContextState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Destination kind.
    pub const fn kind(&self) -> DestinationKind {
        self.kind
    }

    /// Normalized logical path of a file destination.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Whether later opens of the same destination may reuse this context.
    pub const fn is_shared(&self) -> bool {
        self.shared
    }

    pub(crate) fn matches(&self, destination: &Destination) -> bool {
        if self.kind != destination.kind() {
            return false;
        }
        match destination {
            Destination::Stdout | Destination::Stderr => true,
            Destination::File(options) => {
                self.shared
                    && options.shared
                    && self.path.as_deref() == Some(normalize(options.path()).as_path())
            }
        }
    }

    /// Whether the context has been torn down.
    pub fn is_closed(&self) -> bool {
        self.lock().writer.is_none()
    }

    /// Registers message `id` with its severity and display name.
    ///
    /// Registering an id again replaces the previous registration.
    pub fn register_message(&self, id: usize, severity: Severity, name: &str) -> Result<()> {
        self.lock().registry.register(id, severity, name)
    }

    /// Sets the level of every message whose name starts with `prefix`.
    ///
    /// Returns the number of messages affected.
    pub fn set_level(&self, severity: Severity, prefix: Option<&str>) -> usize {
        self.lock().registry.set_level(severity, prefix)
    }

    /// Sets the throttle threshold of every message whose name starts with
    /// `prefix`. `None` disables throttling.
    pub fn set_throttle(&self, threshold: Option<Duration>, prefix: Option<&str>) -> usize {
        self.lock().registry.set_throttle(threshold, prefix)
    }

    /// Flushes pending bytes, then changes the record buffer capacity.
    pub fn set_buffer_size(&self, bytes: usize) -> Result<()> {
        if bytes == 0 {
            return Err(Error::InvalidBufferSize);
        }
        let mut state = self.lock();
        state.write_out(self.clock.now())?;
        state.buffer.set_capacity(bytes);
        Ok(())
    }

    /// Current record buffer capacity.
    pub fn buffer_size(&self) -> usize {
        self.lock().buffer.capacity()
    }

    /// Severity gate without throttling side effects.
    pub fn allowed(&self, severity: Severity, id: usize) -> bool {
        self.lock().registry.allowed(severity, id)
    }

    /// Snapshot of message `id`.
    pub fn message(&self, id: usize) -> Option<MessageInfo> {
        self.lock().registry.get(id).cloned()
    }

    /// Snapshot of every registered message in id order.
    pub fn messages(&self) -> Vec<MessageInfo> {
        self.lock().registry.messages()
    }

    /// Rotation state of a file destination.
    pub fn rotation_state(&self) -> Option<RotationState> {
        let state = self.lock();
        state
            .writer
            .as_ref()
            .and_then(Writer::as_file)
            .map(FileWriter::state)
    }

    /// Shadow file currently receiving the records of a file destination.
    pub fn shadow_path(&self) -> Option<PathBuf> {
        let state = self.lock();
        state
            .writer
            .as_ref()
            .and_then(Writer::as_file)
            .and_then(|file| file.shadow_path().map(Path::to_path_buf))
    }

    /// Emits one record for message `id` at `severity`.
    ///
    /// I/O failures while writing are reported as [`Emission::WriteFailed`];
    /// only a failed rollover or reopen of a file destination returns `Err`.
    ///
    /// # Examples
    ///
    /// ```
    /// use l4c::{ContextTable, Destination, Emission, Severity};
    ///
    /// let table = ContextTable::new();
    /// let handle = table.open(Destination::Stdout)?;
    /// let context = table.get(handle).expect("live handle");
    /// context.register_message(0, Severity::Info, "NET_UP")?;
    ///
    /// let outcome = context.emit(Severity::Info, 0, format_args!("link {} up", "eth0"))?;
    /// assert!(outcome.is_written());
    /// assert_eq!(
    ///     context.emit(Severity::Debug, 0, format_args!("noise"))?,
    ///     Emission::Filtered
    /// );
    /// # Ok::<(), l4c::Error>(())
    /// ```
    pub fn emit(&self, severity: Severity, id: usize, args: fmt::Arguments<'_>) -> Result<Emission> {
        self.emit_with(&RecordStyle::new(), severity, id, args)
    }

    /// Like [`emit`](Self::emit) with an explicit timestamp style and context text.
    pub fn emit_with(
        &self,
        style: &RecordStyle<'_>,
        severity: Severity,
        id: usize,
        args: fmt::Arguments<'_>,
    ) -> Result<Emission> {
        self.emit_record(style, Some(severity), id, args, false)
    }

    /// Emits at the severity message `id` was registered with.
    pub fn emit_registered(&self, id: usize, args: fmt::Arguments<'_>) -> Result<Emission> {
        self.emit_record(&RecordStyle::new(), None, id, args, false)
    }

    /// Renders the record into the buffer and writes only once the buffer
    /// has reached its capacity.
    ///
    /// Pending records go out with the next one-shot emission, on
    /// [`flush`](Self::flush), on a buffer resize and when the context is
    /// closed. The gate and throttle apply exactly as for [`emit`](Self::emit).
    ///
    /// # Examples
    ///
    /// ```
    /// use l4c::{ContextTable, Destination, Emission, Severity};
    ///
    /// let table = ContextTable::new();
    /// let handle = table.open(Destination::Stdout)?;
    /// let context = table.get(handle).expect("live handle");
    /// context.register_message(0, Severity::Info, "NET_RX")?;
    ///
    /// let outcome = context.emit_buffered(Severity::Info, 0, format_args!("{} frames", 12))?;
    /// assert!(matches!(outcome, Emission::Buffered { .. }));
    /// assert!(context.flush()?);
    /// # Ok::<(), l4c::Error>(())
    /// ```
    pub fn emit_buffered(
        &self,
        severity: Severity,
        id: usize,
        args: fmt::Arguments<'_>,
    ) -> Result<Emission> {
        self.emit_buffered_with(&RecordStyle::new(), severity, id, args)
    }

    /// Like [`emit_buffered`](Self::emit_buffered) with an explicit style.
    pub fn emit_buffered_with(
        &self,
        style: &RecordStyle<'_>,
        severity: Severity,
        id: usize,
        args: fmt::Arguments<'_>,
    ) -> Result<Emission> {
        self.emit_record(style, Some(severity), id, args, true)
    }

    fn emit_record(
        &self,
        style: &RecordStyle<'_>,
        severity: Option<Severity>,
        id: usize,
        args: fmt::Arguments<'_>,
        buffered: bool,
    ) -> Result<Emission> {
        let now = self.clock.now();
        let mut guard = self.lock();
        let state = &mut *guard;
        if state.writer.is_none() {
            return Ok(Emission::Closed);
        }
        let Some(severity) = severity.or_else(|| {
            state
                .registry
                .get(id)
                .map(MessageInfo::registered_severity)
        }) else {
            return Ok(Emission::Filtered);
        };

        let suppressed = match state.registry.admit(severity, id, now) {
            Admission::Filtered => return Ok(Emission::Filtered),
            Admission::Throttled => return Ok(Emission::Throttled),
            Admission::Emit { suppressed } => suppressed,
        };
        let Some(info) = state.registry.get(id) else {
            return Ok(Emission::Filtered);
        };
        let header = RecordHeader {
            now,
            pid: self.pid,
            name: info.name(),
            severity,
            suppressed,
            style,
        };

        let bytes = match state.buffer.append_fmt(format_args!("{header}{args}\n")) {
            Ok(bytes) => bytes,
            Err(error) => {
                warn!(target: "l4c", id, %error, "record discarded");
                return Ok(error.into());
            }
        };
        if buffered && !state.buffer.is_full() {
            return Ok(Emission::Buffered { bytes });
        }
        if state.write_out(now)? {
            Ok(Emission::Written { bytes })
        } else {
            Ok(Emission::WriteFailed)
        }
    }

    /// Starts a streamed record: renders the prefix followed by `args`.
    ///
    /// Returns `None` when the record is filtered, throttled, or the context
    /// is closed. The returned stream holds the context lock until it is
    /// stopped or dropped; logging into the same context from the holding
    /// thread meanwhile deadlocks.
    ///
    /// # Examples
    ///
    /// ```
    /// use l4c::{ContextTable, Destination, Severity};
    ///
    /// let table = ContextTable::new();
    /// let handle = table.open(Destination::Stdout)?;
    /// let context = table.get(handle).expect("live handle");
    /// context.register_message(3, Severity::Debug, "DB_ROWS")?;
    ///
    /// if let Some(mut stream) = context.start(Severity::Debug, 3, format_args!("rows:")) {
    ///     for row in [1, 2, 3] {
    ///         stream.append(format_args!(" {row}"));
    ///     }
    ///     stream.stop(format_args!(" (done)"))?;
    /// }
    /// # Ok::<(), l4c::Error>(())
    /// ```
    pub fn start(
        &self,
        severity: Severity,
        id: usize,
        args: fmt::Arguments<'_>,
    ) -> Option<RecordStream<'_>> {
        self.start_with(&RecordStyle::new(), severity, id, args)
    }

    /// Like [`start`](Self::start) with an explicit style.
    pub fn start_with(
        &self,
        style: &RecordStyle<'_>,
        severity: Severity,
        id: usize,
        args: fmt::Arguments<'_>,
    ) -> Option<RecordStream<'_>> {
        let now = self.clock.now();
        let mut guard = self.lock();
        let state = &mut *guard;
        if state.writer.is_none() {
            return None;
        }
        let Admission::Emit { suppressed } = state.registry.admit(severity, id, now) else {
            return None;
        };
        let info = state.registry.get(id)?;
        let header = RecordHeader {
            now,
            pid: self.pid,
            name: info.name(),
            severity,
            suppressed,
            style,
        };

        let mark = state.buffer.len();
        let rendered = state.buffer.append_fmt(format_args!("{header}{args}"));
        let mut stream = RecordStream {
            context: self,
            state: guard,
            mark,
            bytes: 0,
            flushed: false,
            failed: None,
            error: None,
            done: false,
        };
        stream.absorb(rendered);
        Some(stream)
    }

    /// Runs `f` under the context lock when message `id` is allowed at
    /// `severity`. The throttle is not consulted.
    ///
    /// `f` must not log into this context.
    pub fn do_at<R>(
        &self,
        severity: Severity,
        id: usize,
        f: impl FnOnce(&MessageInfo) -> R,
    ) -> Option<R> {
        let state = self.lock();
        let info = state.registry.get(id)?;
        info.effective_severity().admits(severity).then(|| f(info))
    }

    /// Writes pending bytes, returning `Ok(false)` if they were dropped.
    pub fn flush(&self) -> Result<bool> {
        self.lock().write_out(self.clock.now())
    }

    /// Flushes and releases the destination. Later emissions report
    /// [`Emission::Closed`].
    pub(crate) fn teardown(&self) -> Result<()> {
        let mut state = self.lock();
        let flushed = state.write_out(self.clock.now());
        if let Some(mut writer) = state.writer.take() {
            writer.close();
        }
        flushed.map(|_| ())
    }
}

/// A record being built from several fragments.
///
/// Created by [`LoggerContext::start`]. Holds the context lock until
/// [`stop`](Self::stop) or [`finish`](Self::finish) writes the record.
/// Dropping the stream without stopping it discards whatever part of the
/// record has not been flushed yet; a record whose head was already flushed
/// is cut short and terminated with a newline.
#[must_use = "a streamed record is discarded unless `stop` or `finish` is called"]
pub struct RecordStream<'a> {
    context: &'a LoggerContext,
    state: MutexGuard<'a, ContextState>,
    mark: usize,
    bytes: usize,
    flushed: bool,
    failed: Option<Emission>,
    error: Option<Error>,
    done: bool,
}

impl fmt::Debug for RecordStream<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordStream")
            .field("mark", &self.mark)
            .field("bytes", &self.bytes)
            .field("flushed", &self.flushed)
            .field("failed", &self.failed)
            .finish_non_exhaustive()
    }
}

impl RecordStream<'_> {
    /// Appends a fragment. Ignored once the record has failed.
    pub fn append(&mut self, args: fmt::Arguments<'_>) -> &mut Self {
        if self.failed.is_none() {
            let rendered = self.state.buffer.append_fmt(args);
            self.absorb(rendered);
        }
        self
    }

    /// Appends the final fragment and a newline, then writes the record.
    pub fn stop(mut self, args: fmt::Arguments<'_>) -> Result<Emission> {
        if self.failed.is_none() {
            match self.state.buffer.append_fmt(format_args!("{args}\n")) {
                Ok(bytes) => self.bytes += bytes,
                Err(error) => self.failed = Some(error.into()),
            }
        }
        self.done = true;

        if let Some(error) = self.error.take() {
            self.discard();
            return Err(error);
        }
        if let Some(emission) = self.failed {
            warn!(target: "l4c", ?emission, "streamed record discarded");
            self.discard();
            return Ok(emission);
        }
        if self.state.write_out(self.context.clock.now())? {
            Ok(Emission::Written { bytes: self.bytes })
        } else {
            Ok(Emission::WriteFailed)
        }
    }

    /// Terminates the record with a newline and writes it.
    pub fn finish(self) -> Result<Emission> {
        self.stop(format_args!(""))
    }

    fn absorb(&mut self, rendered: std::result::Result<usize, FormatError>) {
        match rendered {
            Ok(bytes) => {
                self.bytes += bytes;
                if self.state.buffer.is_full() {
                    self.auto_flush();
                }
            }
            Err(error) => self.failed = Some(error.into()),
        }
    }

    fn auto_flush(&mut self) {
        match self.state.write_out(self.context.clock.now()) {
            Ok(true) => self.flushed = true,
            Ok(false) => self.failed = Some(Emission::WriteFailed),
            Err(error) => {
                self.failed = Some(Emission::WriteFailed);
                self.error = Some(error);
            }
        }
        self.mark = 0;
    }

    /// Drops the unwritten tail of the record. When its head already went
    /// out with an auto-flush, the line is terminated so the next record
    /// starts on a line of its own.
    fn discard(&mut self) {
        let mark = self.mark;
        self.state.buffer.truncate(mark);
        if !self.flushed {
            return;
        }
        self.state.buffer.push_bytes(b"\n");
        if let Err(error) = self.state.write_out(self.context.clock.now()) {
            warn!(target: "l4c", %error, "cannot terminate partially written record");
        }
    }
}

impl Drop for RecordStream<'_> {
    fn drop(&mut self) {
        if !self.done {
            self.discard();
        }
    }
}

/// Lexical normalization used for destination signatures.
fn normalize(path: &Path) -> PathBuf {
    path.components().collect()
}
