//! Log severity levels.

use core::fmt;

/// Severity of a log entry.
///
/// Levels are ordered; a collector records an entry when the entry's level
/// is at or above the configured minimum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    /// Fine-grained events for debugging delivery and scheduling.
    Trace,
    /// Diagnostic events useful during development.
    Debug,
    /// Notable, expected events.
    Info,
    /// Suspicious but non-fatal conditions (unhandled rejections land here).
    Warn,
    /// Failures.
    Error,
}

impl LogLevel {
    /// Returns the uppercase name of the level.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
