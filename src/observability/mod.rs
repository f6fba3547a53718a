//! Structured logging for the settlement core.
//!
//! No component in this crate writes to stdout or stderr. Diagnostics are
//! recorded as structured [`LogEntry`] values in a bounded [`LogCollector`],
//! which the embedding application drains however it likes. The collector
//! carries, among other things, the ambient unhandled-rejection diagnostic:
//! dropping the last handle to a rejected promise nobody observed records a
//! warning here rather than failing the program.
//!
//! # Example
//!
//! ```
//! use vow::observability::{LogCollector, LogEntry, LogLevel, ObservabilityConfig};
//!
//! let config = ObservabilityConfig::default().with_log_level(LogLevel::Debug);
//! let collector = LogCollector::with_config(config);
//!
//! collector.record(
//!     LogEntry::info("request settled").with_field("correlation", "Req7"),
//! );
//! assert_eq!(collector.len(), 1);
//! ```

pub mod collector;
pub mod entry;
pub mod level;

pub use collector::LogCollector;
pub use entry::LogEntry;
pub use level::LogLevel;

/// Configuration for the log collector.
///
/// Builder-style: start from `default()` and chain `with_*` calls.
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// Minimum log level to record.
    log_level: LogLevel,
    /// Maximum number of log entries to retain.
    max_log_entries: usize,
}

impl ObservabilityConfig {
    /// Creates a configuration with default values (`Info`, 1024 entries).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            log_level: LogLevel::Info,
            max_log_entries: 1024,
        }
    }

    /// Sets the minimum level to record.
    #[must_use]
    pub const fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    /// Sets the retention bound of the collector.
    #[must_use]
    pub const fn with_max_log_entries(mut self, max: usize) -> Self {
        self.max_log_entries = max;
        self
    }

    /// Returns the minimum level to record.
    #[must_use]
    pub const fn log_level(&self) -> LogLevel {
        self.log_level
    }

    /// Returns the retention bound.
    #[must_use]
    pub const fn max_log_entries(&self) -> usize {
        self.max_log_entries
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self::new()
    }
}
