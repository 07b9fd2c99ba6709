//! crates/l4c/src/table.rs
//! Slot table of live logger contexts.
//!
//! Callers never hold a context directly. [`ContextTable::open`] hands out a
//! [`LoggerHandle`], a slot index tagged with the slot's generation, and every
//! later call resolves it again. Clearing a slot bumps its generation, so a
//! handle that outlives its context (even one whose slot has since been
//! reused) resolves to nothing instead of to a stranger's destination.
//!
//! The table lock guards slot allocation, refcounts and handle resolution. It
//! is never held while a record is logged or a destination is opened;
//! contexts carry their own lock. Opens and final closes are serialized on a
//! second lock, so two openers of one shareable destination cannot both
//! create it and a reopen never races the teardown of its predecessor.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::debug;

use crate::clock::{Clock, SystemClock};
use crate::config::TableConfig;
use crate::context::{Emission, LoggerContext};
use crate::destination::Destination;
use crate::error::{Error, Result};
use crate::registry::MessageInfo;
use crate::severity::Severity;

/// Opaque reference to a live context in a [`ContextTable`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct LoggerHandle {
    index: u32,
    generation: u32,
}

impl LoggerHandle {
    /// Slot index.
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Generation of the slot when the handle was issued.
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for LoggerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}.{}", self.index, self.generation)
    }
}

#[derive(Debug)]
struct Entry {
    refs: usize,
    context: Arc<LoggerContext>,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    entry: Option<Entry>,
}

/// Process-local registry of logger contexts.
///
/// # Examples
///
/// ```
/// use l4c::{ContextTable, Destination};
///
/// let table = ContextTable::new();
/// let first = table.open(Destination::Stderr)?;
/// let second = table.open(Destination::Stderr)?;
/// assert_eq!(first, second);
/// assert_eq!(table.live_contexts(), 1);
///
/// table.close(first)?;
/// table.close(second)?;
/// assert!(table.get(first).is_none());
/// # Ok::<(), l4c::Error>(())
/// ```
#[derive(Debug)]
pub struct ContextTable {
    config: TableConfig,
    clock: Arc<dyn Clock>,
    slots: Mutex<Vec<Slot>>,
    lifecycle: Mutex<()>,
}

impl Default for ContextTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextTable {
    /// Creates a table with default sizing and the system clock.
    pub fn new() -> Self {
        Self::with_config(TableConfig::default(), Arc::new(SystemClock))
    }

    /// Creates a table with explicit sizing and time source.
    pub fn with_config(config: TableConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            slots: Mutex::new(Vec::new()),
            lifecycle: Mutex::new(()),
        }
    }

    /// Sizing applied to new contexts.
    pub const fn config(&self) -> &TableConfig {
        &self.config
    }

    fn slots(&self) -> MutexGuard<'_, Vec<Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lifecycle(&self) -> MutexGuard<'_, ()> {
        self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Opens `destination`, reusing a live context when it is shareable.
    ///
    /// Standard streams are always shared. A file destination is reused only
    /// when both the live context and this request are marked shared and
    /// their normalized paths agree.
    pub fn open(&self, destination: Destination) -> Result<LoggerHandle> {
        if let Destination::File(options) = &destination
            && !options.path.is_absolute()
        {
            return Err(Error::RelativePath(options.path.clone()));
        }

        let _lifecycle = self.lifecycle();
        {
            let mut slots = self.slots();
            if destination.is_shareable()
                && let Some(handle) = reuse(&mut slots, &destination)
            {
                return Ok(handle);
            }
            if !slots.iter().any(|slot| slot.entry.is_none())
                && slots.len() >= self.config.max_contexts
            {
                return Err(Error::TableExhausted(self.config.max_contexts));
            }
        }

        let kind = destination.kind();
        let context = LoggerContext::open(destination, &self.config, Arc::clone(&self.clock))?;

        let mut slots = self.slots();
        let index = match slots.iter().position(|slot| slot.entry.is_none()) {
            Some(index) => index,
            None => {
                slots.push(Slot::default());
                slots.len() - 1
            }
        };
        let slot = &mut slots[index];
        slot.entry = Some(Entry {
            refs: 1,
            context: Arc::new(context),
        });
        debug!(target: "l4c", index, ?kind, "opened logger context");
        Ok(handle(index, slot.generation))
    }

    /// Adds a reference to a live context.
    pub fn incref(&self, handle: LoggerHandle) -> Result<LoggerHandle> {
        let mut slots = self.slots();
        let entry = resolve_mut(&mut slots, handle).ok_or(Error::InvalidHandle(handle))?;
        entry.refs += 1;
        Ok(handle)
    }

    /// Drops a reference. The last one flushes and releases the destination.
    ///
    /// Errors from that final flush are returned, but the handle is invalid
    /// afterwards either way.
    pub fn close(&self, handle: LoggerHandle) -> Result<()> {
        let _lifecycle = self.lifecycle();
        let retired = {
            let mut slots = self.slots();
            let entry = resolve_mut(&mut slots, handle).ok_or(Error::InvalidHandle(handle))?;
            entry.refs -= 1;
            if entry.refs > 0 {
                return Ok(());
            }
            let slot = &mut slots[handle.index as usize];
            slot.generation = slot.generation.wrapping_add(1);
            slot.entry.take().map(|entry| entry.context)
        };

        match retired {
            Some(context) => {
                debug!(target: "l4c", %handle, "closing logger context");
                context.teardown()
            }
            None => Ok(()),
        }
    }

    /// Resolves `handle` to its context.
    pub fn get(&self, handle: LoggerHandle) -> Option<Arc<LoggerContext>> {
        let slots = self.slots();
        let slot = slots.get(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.entry.as_ref().map(|entry| Arc::clone(&entry.context))
    }

    fn context(&self, handle: LoggerHandle) -> Result<Arc<LoggerContext>> {
        self.get(handle).ok_or(Error::InvalidHandle(handle))
    }

    /// Number of live contexts.
    pub fn live_contexts(&self) -> usize {
        self.slots()
            .iter()
            .filter(|slot| slot.entry.is_some())
            .count()
    }

    /// Reference count of a live context.
    pub fn refcount(&self, handle: LoggerHandle) -> Option<usize> {
        let mut slots = self.slots();
        resolve_mut(&mut slots, handle).map(|entry| entry.refs)
    }

    /// Tears down every live context regardless of its refcount.
    ///
    /// Returns the first teardown error after attempting all of them.
    pub fn shutdown(&self) -> Result<()> {
        let retired: Vec<Arc<LoggerContext>> = {
            let mut slots = self.slots();
            slots
                .iter_mut()
                .filter_map(|slot| {
                    let entry = slot.entry.take()?;
                    slot.generation = slot.generation.wrapping_add(1);
                    Some(entry.context)
                })
                .collect()
        };

        let mut first_error = None;
        for context in retired {
            if let Err(error) = context.teardown() {
                tracing::warn!(target: "l4c", %error, "teardown failed during shutdown");
                first_error.get_or_insert(error);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// See [`LoggerContext::register_message`].
    pub fn register_message(
        &self,
        handle: LoggerHandle,
        id: usize,
        severity: Severity,
        name: &str,
    ) -> Result<()> {
        self.context(handle)?.register_message(id, severity, name)
    }

    /// See [`LoggerContext::set_level`].
    pub fn set_level(
        &self,
        handle: LoggerHandle,
        severity: Severity,
        prefix: Option<&str>,
    ) -> Result<usize> {
        Ok(self.context(handle)?.set_level(severity, prefix))
    }

    /// See [`LoggerContext::set_throttle`].
    pub fn set_throttle(
        &self,
        handle: LoggerHandle,
        threshold: Option<Duration>,
        prefix: Option<&str>,
    ) -> Result<usize> {
        Ok(self.context(handle)?.set_throttle(threshold, prefix))
    }

    /// See [`LoggerContext::set_buffer_size`].
    pub fn set_buffer_size(&self, handle: LoggerHandle, bytes: usize) -> Result<()> {
        self.context(handle)?.set_buffer_size(bytes)
    }

    /// See [`LoggerContext::emit`].
    pub fn emit(
        &self,
        handle: LoggerHandle,
        severity: Severity,
        id: usize,
        args: fmt::Arguments<'_>,
    ) -> Result<Emission> {
        self.context(handle)?.emit(severity, id, args)
    }

    /// See [`LoggerContext::emit_buffered`].
    pub fn emit_buffered(
        &self,
        handle: LoggerHandle,
        severity: Severity,
        id: usize,
        args: fmt::Arguments<'_>,
    ) -> Result<Emission> {
        self.context(handle)?.emit_buffered(severity, id, args)
    }

    /// See [`LoggerContext::flush`].
    pub fn flush(&self, handle: LoggerHandle) -> Result<bool> {
        self.context(handle)?.flush()
    }

    /// See [`LoggerContext::messages`].
    pub fn messages(&self, handle: LoggerHandle) -> Result<Vec<MessageInfo>> {
        Ok(self.context(handle)?.messages())
    }
}

impl Drop for ContextTable {
    fn drop(&mut self) {
        if let Err(error) = self.shutdown() {
            tracing::warn!(target: "l4c", %error, "logger table dropped with failing contexts");
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
const fn handle(index: usize, generation: u32) -> LoggerHandle {
    LoggerHandle {
        index: index as u32,
        generation,
    }
}

/// Takes another reference on a live context matching `destination`.
fn reuse(slots: &mut [Slot], destination: &Destination) -> Option<LoggerHandle> {
    for (index, slot) in slots.iter_mut().enumerate() {
        let generation = slot.generation;
        if let Some(entry) = slot.entry.as_mut()
            && entry.context.matches(destination)
        {
            entry.refs += 1;
            return Some(handle(index, generation));
        }
    }
    None
}

fn resolve_mut(slots: &mut [Slot], handle: LoggerHandle) -> Option<&mut Entry> {
    let slot = slots.get_mut(handle.index as usize)?;
    if slot.generation != handle.generation {
        return None;
    }
    slot.entry.as_mut()
}
