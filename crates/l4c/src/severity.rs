//! crates/l4c/src/severity.rs
//! Syslog-style severity ordinals.

use std::fmt;
use std::str::FromStr;

/// Severity of a log record, ordered the way syslog(3) orders priorities.
///
/// Lower ordinals are more severe: [`Severity::Emerg`] is `0` and
/// [`Severity::Debug`] is `7`. The derived [`Ord`] follows the ordinal, so
/// `Severity::Error < Severity::Info` holds.
///
/// A message's configured severity acts as a verbosity ceiling: a record
/// requested at severity `R` passes the gate when the configured level `E`
/// satisfies `E >= R`.
///
/// # Examples
///
/// ```
/// use l4c::Severity;
///
/// assert!(Severity::Error < Severity::Info);
/// assert_eq!(Severity::Warning.name(), "WARNING");
/// assert_eq!("LOG_ERR".parse::<Severity>(), Ok(Severity::Error));
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[repr(u8)]
pub enum Severity {
    /// System is unusable.
    Emerg = 0,
    /// Action must be taken immediately.
    Alert = 1,
    /// Critical conditions.
    Crit = 2,
    /// Error conditions.
    Error = 3,
    /// Warning conditions.
    Warning = 4,
    /// Normal but significant condition.
    Notice = 5,
    /// Informational message.
    Info = 6,
    /// Debug-level message.
    Debug = 7,
}

impl Severity {
    /// Every severity in ordinal order.
    pub const ALL: [Self; 8] = [
        Self::Emerg,
        Self::Alert,
        Self::Crit,
        Self::Error,
        Self::Warning,
        Self::Notice,
        Self::Info,
        Self::Debug,
    ];

    /// Returns the ordinal (`0` for EMERG through `7` for DEBUG).
    #[must_use]
    pub const fn ordinal(self) -> u8 {
        self as u8
    }

    /// Looks up a severity by ordinal.
    #[must_use]
    pub const fn from_ordinal(ordinal: u8) -> Option<Self> {
        match ordinal {
            0 => Some(Self::Emerg),
            1 => Some(Self::Alert),
            2 => Some(Self::Crit),
            3 => Some(Self::Error),
            4 => Some(Self::Warning),
            5 => Some(Self::Notice),
            6 => Some(Self::Info),
            7 => Some(Self::Debug),
            _ => None,
        }
    }

    /// Upper-case name rendered into every record prefix.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Emerg => "EMERG",
            Self::Alert => "ALERT",
            Self::Crit => "CRIT",
            Self::Error => "ERROR",
            Self::Warning => "WARNING",
            Self::Notice => "NOTICE",
            Self::Info => "INFO",
            Self::Debug => "DEBUG",
        }
    }

    /// Reports whether a record requested at `requested` passes when this
    /// severity is the configured ceiling.
    #[must_use]
    pub fn admits(self, requested: Self) -> bool {
        self >= requested
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a severity token is not recognised.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("unknown severity: {0:?}")]
pub struct ParseSeverityError(pub String);

impl FromStr for Severity {
    type Err = ParseSeverityError;

    /// Parses the names accepted in message catalogs.
    ///
    /// Matching is case-insensitive, an optional `LOG_` prefix is ignored, and
    /// the syslog(3) spellings (`ERR`, `EMERGENCY`, `CRITICAL`, `WARN`) are
    /// accepted alongside the rendered names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        let token = upper.strip_prefix("LOG_").unwrap_or(&upper);
        match token {
            "EMERG" | "EMERGENCY" => Ok(Self::Emerg),
            "ALERT" => Ok(Self::Alert),
            "CRIT" | "CRITICAL" => Ok(Self::Crit),
            "ERR" | "ERROR" => Ok(Self::Error),
            "WARNING" | "WARN" => Ok(Self::Warning),
            "NOTICE" => Ok(Self::Notice),
            "INFO" => Ok(Self::Info),
            "DEBUG" => Ok(Self::Debug),
            _ => Err(ParseSeverityError(s.to_owned())),
        }
    }
}
