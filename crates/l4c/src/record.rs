//! crates/l4c/src/record.rs
//! Record prefix rendering.
//!
//! Every record starts with the same fixed prefix:
//!
//! ```text
//! <timestamp> [<pid>] <name> <SEVERITY>[<suppressed>]: <context><message>
//! ```
//!
//! The field order and the bracketed suppressed count are relied upon by log
//! parsers downstream, so they never vary. Only the timestamp rendering and
//! the optional context text are selectable through [`RecordStyle`].

use std::fmt;
use std::time::SystemTime;

use time::format_description::FormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

use crate::clock::unix_seconds;
use crate::severity::Severity;

const LOCAL_TIMESTAMP_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// How the leading timestamp of a record is rendered.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TimestampFormat {
    /// Seconds since the Unix epoch with microsecond precision, e.g. `1700000000.250000`.
    #[default]
    Epoch,
    /// Local wall-clock time, e.g. `2023-11-14 22:13:20`.
    Local,
    /// Epoch seconds followed by local wall-clock time.
    EpochAndLocal,
}

/// Per-call rendering options for a record.
///
/// # Examples
///
/// ```
/// use l4c::{RecordStyle, TimestampFormat};
///
/// let style = RecordStyle::new()
///     .timestamp(TimestampFormat::Local)
///     .context("conn 42: ");
/// assert_eq!(style.context, Some("conn 42: "));
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RecordStyle<'a> {
    /// Timestamp rendering.
    pub timestamp: TimestampFormat,
    /// Text inserted between the prefix and the message.
    pub context: Option<&'a str>,
}

impl<'a> RecordStyle<'a> {
    /// Epoch timestamps and no context.
    pub const fn new() -> Self {
        Self {
            timestamp: TimestampFormat::Epoch,
            context: None,
        }
    }

    /// Selects the timestamp rendering.
    pub const fn timestamp(mut self, timestamp: TimestampFormat) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Sets the context text.
    pub const fn context(mut self, context: &'a str) -> Self {
        self.context = Some(context);
        self
    }
}

/// The fixed prefix of one record.
pub(crate) struct RecordHeader<'a> {
    pub(crate) now: SystemTime,
    pub(crate) pid: u32,
    pub(crate) name: &'a str,
    pub(crate) severity: Severity,
    pub(crate) suppressed: u32,
    pub(crate) style: &'a RecordStyle<'a>,
}

impl fmt::Display for RecordHeader<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.style.timestamp {
            TimestampFormat::Epoch => write!(f, "{:.6}", unix_seconds(self.now))?,
            TimestampFormat::Local => f.write_str(&local_timestamp(self.now))?,
            TimestampFormat::EpochAndLocal => write!(
                f,
                "{:.6} {}",
                unix_seconds(self.now),
                local_timestamp(self.now)
            )?,
        }
        write!(
            f,
            " [{}] {} {}[{}]: ",
            self.pid, self.name, self.severity, self.suppressed
        )?;
        if let Some(context) = self.style.context {
            f.write_str(context)?;
        }
        Ok(())
    }
}

/// Renders `at` in the local offset, or UTC when the offset is unknown.
fn local_timestamp(at: SystemTime) -> String {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    OffsetDateTime::from(at)
        .to_offset(offset)
        .format(LOCAL_TIMESTAMP_FORMAT)
        .unwrap_or_else(|_| "1970-01-01 00:00:00".to_owned())
}
