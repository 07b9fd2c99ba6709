//! crates/l4c/src/registry.rs
//! Per-context message registry and the severity/throttle gate.
//!
//! Message ids are small dense integers assigned by the call site (usually a
//! generated catalog). The registry is a fixed-capacity array indexed by id;
//! a slot only becomes meaningful once [`MessageRegistry::register`] has
//! written it.

use std::time::{Duration, SystemTime};

use crate::error::{Error, Result};
use crate::severity::Severity;

/// Metadata of one registered message.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MessageInfo {
    id: usize,
    registered: Severity,
    effective: Severity,
    name: String,
    throttle: Option<Duration>,
    last_emitted: Option<SystemTime>,
    suppressed: u32,
}

impl MessageInfo {
    fn new(id: usize, severity: Severity, name: &str) -> Self {
        Self {
            id,
            registered: severity,
            effective: severity,
            name: name.to_owned(),
            throttle: None,
            last_emitted: None,
            suppressed: 0,
        }
    }

    /// Message id (slot index).
    pub const fn id(&self) -> usize {
        self.id
    }

    /// Severity the message was registered with.
    pub const fn registered_severity(&self) -> Severity {
        self.registered
    }

    /// Current verbosity ceiling, initially the registered severity.
    pub const fn effective_severity(&self) -> Severity {
        self.effective
    }

    /// Display name used in record prefixes and prefix matching.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Minimum interval between emissions, if throttled.
    pub const fn throttle(&self) -> Option<Duration> {
        self.throttle
    }

    /// Attempts dropped by the throttle since the last emission.
    pub const fn suppressed(&self) -> u32 {
        self.suppressed
    }

    fn matches(&self, prefix: Option<&str>) -> bool {
        prefix.is_none_or(|prefix| self.name.starts_with(prefix))
    }
}

/// Outcome of passing a record through the gate.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Admission {
    /// Severity above the configured ceiling or id not registered.
    Filtered,
    /// Inside the throttle window; the attempt was counted.
    Throttled,
    /// Emit, reporting this many previously suppressed attempts.
    Emit {
        /// Attempts dropped since the previous emission.
        suppressed: u32,
    },
}

/// Dense id-indexed table of [`MessageInfo`] slots.
#[derive(Debug)]
pub struct MessageRegistry {
    slots: Vec<Option<MessageInfo>>,
    capacity: usize,
}

impl MessageRegistry {
    /// Creates an empty registry accepting ids in `0..capacity`.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Vec::new(),
            capacity,
        }
    }

    /// Number of ids the registry accepts.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Registers (or re-registers) message `id`.
    ///
    /// Re-registration overwrites the slot completely: the effective severity
    /// resets to `severity` and throttle state is cleared.
    pub fn register(&mut self, id: usize, severity: Severity, name: &str) -> Result<()> {
        if id >= self.capacity {
            return Err(Error::MessageIdOutOfRange {
                id,
                capacity: self.capacity,
            });
        }
        if self.slots.len() <= id {
            self.slots.resize(id + 1, None);
        }
        self.slots[id] = Some(MessageInfo::new(id, severity, name));
        Ok(())
    }

    /// Returns the message registered at `id`.
    pub fn get(&self, id: usize) -> Option<&MessageInfo> {
        self.slots.get(id).and_then(Option::as_ref)
    }

    /// Sets the effective severity of every message whose name starts with
    /// `prefix` (all messages when `None`), returning how many changed.
    pub fn set_level(&mut self, severity: Severity, prefix: Option<&str>) -> usize {
        self.apply(prefix, |info| info.effective = severity)
    }

    /// Sets the throttle threshold of every matching message. `None` or a zero
    /// duration disables throttling.
    pub fn set_throttle(&mut self, threshold: Option<Duration>, prefix: Option<&str>) -> usize {
        let threshold = threshold.filter(|threshold| !threshold.is_zero());
        self.apply(prefix, |info| info.throttle = threshold)
    }

    fn apply(&mut self, prefix: Option<&str>, mut update: impl FnMut(&mut MessageInfo)) -> usize {
        let mut affected = 0;
        for info in self.slots.iter_mut().flatten() {
            if info.matches(prefix) {
                update(info);
                affected += 1;
            }
        }
        affected
    }

    /// Severity gate: `true` when `id` is registered and its effective
    /// severity admits `requested`.
    pub fn allowed(&self, requested: Severity, id: usize) -> bool {
        self.get(id)
            .is_some_and(|info| info.effective.admits(requested))
    }

    /// Runs the full gate for one emission attempt at `now`.
    pub(crate) fn admit(&mut self, requested: Severity, id: usize, now: SystemTime) -> Admission {
        let Some(info) = self.slots.get_mut(id).and_then(Option::as_mut) else {
            return Admission::Filtered;
        };
        if !info.effective.admits(requested) {
            return Admission::Filtered;
        }

        let open = match (info.throttle, info.last_emitted) {
            (Some(threshold), Some(last)) => last
                .checked_add(threshold)
                .is_some_and(|next| next <= now),
            _ => true,
        };

        if open {
            let suppressed = info.suppressed;
            info.suppressed = 0;
            info.last_emitted = Some(now);
            Admission::Emit { suppressed }
        } else {
            info.suppressed = info.suppressed.saturating_add(1);
            Admission::Throttled
        }
    }

    /// Snapshot of every registered message in id order.
    pub fn messages(&self) -> Vec<MessageInfo> {
        self.slots.iter().flatten().cloned().collect()
    }

    /// Number of registered messages.
    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Whether no message has been registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests;
