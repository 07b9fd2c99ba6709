//! crates/l4c/src/buffer.rs
//! Bounded record buffer used by the formatter.
//!
//! Each logger context owns one [`RecordBuffer`]. Records are rendered into
//! it and handed to the writer, after which the buffer is rewound: its length
//! drops to zero while the allocation is kept for the next record.
//!
//! The configured capacity bounds every individual formatting call rather
//! than the buffer as a whole. A call that would produce more than `capacity`
//! bytes fails and leaves the buffer exactly as it was before the call.

use std::fmt::{self, Write as _};

/// Reasons a formatting call into a [`RecordBuffer`] can fail.
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
pub enum FormatError {
    /// The rendered text exceeded the buffer capacity.
    #[error("rendered text exceeds buffer capacity of {capacity} bytes")]
    Overflow {
        /// Capacity in effect for the failed call.
        capacity: usize,
    },
    /// A `Display` implementation reported an error.
    #[error("formatting trait implementation returned an error")]
    Fmt,
}

/// Growable byte buffer with a per-call formatting limit.
#[derive(Debug)]
pub struct RecordBuffer {
    bytes: Vec<u8>,
    capacity: usize,
}

impl RecordBuffer {
    /// Creates an empty buffer. A zero capacity is clamped to one byte.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    /// Configured capacity in bytes.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Replaces the capacity; pending bytes are kept.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
    }

    /// Number of pending bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether no bytes are pending.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Whether pending bytes reached the capacity.
    pub fn is_full(&self) -> bool {
        self.bytes.len() >= self.capacity
    }

    /// Pending bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Logically empties the buffer, keeping its allocation.
    pub fn rewind(&mut self) {
        self.bytes.clear();
    }

    /// Drops pending bytes past `len`.
    pub fn truncate(&mut self, len: usize) {
        self.bytes.truncate(len);
    }

    /// Appends raw bytes without applying the formatting limit.
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }

    /// Renders `args`, returning the number of bytes appended.
    ///
    /// On failure the buffer is restored to its length before the call.
    ///
    /// # Examples
    ///
    /// ```
    /// use l4c::{FormatError, RecordBuffer};
    ///
    /// let mut buffer = RecordBuffer::with_capacity(8);
    /// assert_eq!(buffer.append_fmt(format_args!("{}-{}", 1, 2)), Ok(3));
    /// assert_eq!(
    ///     buffer.append_fmt(format_args!("{}", "too long for eight")),
    ///     Err(FormatError::Overflow { capacity: 8 })
    /// );
    /// assert_eq!(buffer.as_bytes(), b"1-2");
    /// ```
    pub fn append_fmt(&mut self, args: fmt::Arguments<'_>) -> Result<usize, FormatError> {
        let mark = self.bytes.len();
        let mut sink = Bounded {
            out: &mut self.bytes,
            remaining: self.capacity,
            overflowed: false,
        };
        let result = sink.write_fmt(args);
        let overflowed = sink.overflowed;
        match result {
            Ok(()) => Ok(self.bytes.len() - mark),
            Err(fmt::Error) => {
                self.bytes.truncate(mark);
                if overflowed {
                    Err(FormatError::Overflow {
                        capacity: self.capacity,
                    })
                } else {
                    Err(FormatError::Fmt)
                }
            }
        }
    }
}

struct Bounded<'a> {
    out: &'a mut Vec<u8>,
    remaining: usize,
    overflowed: bool,
}

impl fmt::Write for Bounded<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if s.len() > self.remaining {
            self.overflowed = true;
            return Err(fmt::Error);
        }
        self.remaining -= s.len();
        self.out.extend_from_slice(s.as_bytes());
        Ok(())
    }
}

#[cfg(test)]
mod tests;
