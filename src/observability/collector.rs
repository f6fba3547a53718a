//! Bounded, thread-safe log collection.

use std::collections::VecDeque;
use std::sync::Mutex;

use super::entry::LogEntry;
use super::level::LogLevel;
use super::ObservabilityConfig;

/// A bounded sink for [`LogEntry`] values.
///
/// Entries below the configured minimum level are discarded. When the
/// retention bound is reached the oldest entry is evicted; evictions are
/// counted so a reader can tell the log is partial.
///
/// The collector is shared across threads (promises settled from a worker
/// record diagnostics here too), so all access goes through a lock.
#[derive(Debug)]
pub struct LogCollector {
    min_level: LogLevel,
    capacity: usize,
    state: Mutex<CollectorState>,
}

#[derive(Debug, Default)]
struct CollectorState {
    entries: VecDeque<LogEntry>,
    evicted: u64,
}

impl LogCollector {
    /// Creates a collector with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ObservabilityConfig::default())
    }

    /// Creates a collector from a configuration.
    #[must_use]
    pub fn with_config(config: ObservabilityConfig) -> Self {
        Self {
            min_level: config.log_level(),
            capacity: config.max_log_entries().max(1),
            state: Mutex::new(CollectorState::default()),
        }
    }

    /// Records an entry if it passes the level filter.
    pub fn record(&self, entry: LogEntry) {
        if entry.level() < self.min_level {
            return;
        }
        let mut state = self.state.lock().expect("collector lock poisoned");
        if state.entries.len() == self.capacity {
            state.entries.pop_front();
            state.evicted += 1;
        }
        state.entries.push_back(entry);
    }

    /// Returns a snapshot of the retained entries, oldest first.
    #[must_use]
    pub fn entries(&self) -> Vec<LogEntry> {
        let state = self.state.lock().expect("collector lock poisoned");
        state.entries.iter().cloned().collect()
    }

    /// Returns the number of retained entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().expect("collector lock poisoned").entries.len()
    }

    /// Returns true if nothing is retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns how many entries were evicted by the retention bound.
    #[must_use]
    pub fn evicted(&self) -> u64 {
        self.state.lock().expect("collector lock poisoned").evicted
    }

    /// Removes and returns all retained entries, oldest first.
    pub fn drain(&self) -> Vec<LogEntry> {
        let mut state = self.state.lock().expect("collector lock poisoned");
        state.entries.drain(..).collect()
    }
}

impl Default for LogCollector {
    fn default() -> Self {
        Self::new()
    }
}
