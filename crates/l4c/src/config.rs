//! crates/l4c/src/config.rs
//! Sizing knobs for a [`ContextTable`](crate::ContextTable).

/// Default capacity of a context's record buffer in bytes.
pub const DEFAULT_BUFFER_SIZE: usize = 4096;

/// Default number of message slots in each context's registry.
pub const MAX_MESSAGES: usize = 1024;

/// Default upper bound on simultaneously live contexts.
pub const DEFAULT_MAX_CONTEXTS: usize = 1024;

/// Table-wide configuration applied to every context the table creates.
///
/// # Examples
///
/// ```
/// use l4c::TableConfig;
///
/// let config = TableConfig::default().with_buffer_size(16 * 1024);
/// assert_eq!(config.buffer_size, 16 * 1024);
/// assert_eq!(config.max_messages, l4c::MAX_MESSAGES);
/// ```
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TableConfig {
    /// Maximum number of live contexts; `open` fails with
    /// [`Error::TableExhausted`](crate::Error::TableExhausted) beyond it.
    pub max_contexts: usize,
    /// Initial record buffer capacity for new contexts.
    pub buffer_size: usize,
    /// Number of message ids each context's registry accepts.
    pub max_messages: usize,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            max_contexts: DEFAULT_MAX_CONTEXTS,
            buffer_size: DEFAULT_BUFFER_SIZE,
            max_messages: MAX_MESSAGES,
        }
    }
}

impl TableConfig {
    /// Sets [`max_contexts`](Self::max_contexts).
    pub fn with_max_contexts(mut self, max_contexts: usize) -> Self {
        self.max_contexts = max_contexts;
        self
    }

    /// Sets [`buffer_size`](Self::buffer_size). Zero is clamped to one byte.
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size.max(1);
        self
    }

    /// Sets [`max_messages`](Self::max_messages).
    pub fn with_max_messages(mut self, max_messages: usize) -> Self {
        self.max_messages = max_messages;
        self
    }
}
