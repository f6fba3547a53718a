//! Single-lane FIFO reaction scheduler.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::observability::{LogCollector, LogEntry, ObservabilityConfig};

type Reaction = Box<dyn FnOnce() + Send + 'static>;

/// Configuration for a [`Scheduler`].
///
/// Builder-style: start from `default()` and chain `with_*` calls.
#[derive(Debug, Clone, Default)]
pub struct SchedulerConfig {
    observability: ObservabilityConfig,
    collector: Option<Arc<LogCollector>>,
    queue_warn_threshold: Option<usize>,
}

impl SchedulerConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the observability configuration used to build the scheduler's
    /// own collector. Ignored when a shared collector is injected.
    #[must_use]
    pub fn with_observability(mut self, config: ObservabilityConfig) -> Self {
        self.observability = config;
        self
    }

    /// Injects a collector shared with other components.
    #[must_use]
    pub fn with_collector(mut self, collector: Arc<LogCollector>) -> Self {
        self.collector = Some(collector);
        self
    }

    /// Records a warning once the queue grows past `threshold` reactions.
    #[must_use]
    pub const fn with_queue_warn_threshold(mut self, threshold: usize) -> Self {
        self.queue_warn_threshold = Some(threshold);
        self
    }
}

/// The FIFO reaction queue of one execution context.
///
/// Cloning a `Scheduler` yields another handle onto the same queue. Any
/// thread may enqueue (a worker settling a promise owned by the main
/// context does exactly that), but draining is the owning context's job,
/// done from exactly one thread at a time.
///
/// No reaction ever runs inside the call that registered or scheduled it:
/// user code runs only inside [`tick`](Self::tick) and
/// [`run_until_idle`](Self::run_until_idle).
#[derive(Clone)]
pub struct Scheduler {
    inner: Arc<SchedulerInner>,
}

struct SchedulerInner {
    queue: Mutex<VecDeque<Reaction>>,
    collector: Arc<LogCollector>,
    queue_warn_threshold: Option<usize>,
}

impl Scheduler {
    /// Creates a scheduler with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(SchedulerConfig::default())
    }

    /// Creates a scheduler from a configuration.
    #[must_use]
    pub fn with_config(config: SchedulerConfig) -> Self {
        let collector = config
            .collector
            .unwrap_or_else(|| Arc::new(LogCollector::with_config(config.observability)));
        Self {
            inner: Arc::new(SchedulerInner {
                queue: Mutex::new(VecDeque::new()),
                collector,
                queue_warn_threshold: config.queue_warn_threshold,
            }),
        }
    }

    /// Enqueues a reaction at the back of the queue.
    ///
    /// The reaction will not run until the owning context drains the queue;
    /// this call always returns first.
    pub fn schedule(&self, reaction: impl FnOnce() + Send + 'static) {
        let depth = {
            let mut queue = self.inner.queue.lock().expect("scheduler queue poisoned");
            queue.push_back(Box::new(reaction));
            queue.len()
        };
        if let Some(threshold) = self.inner.queue_warn_threshold {
            if depth == threshold {
                self.inner.collector.record(
                    LogEntry::warn("reaction queue depth reached threshold")
                        .with_field("depth", depth.to_string()),
                );
            }
        }
    }

    /// Runs at most one queued reaction. Returns true if one ran.
    pub fn tick(&self) -> bool {
        let reaction = {
            let mut queue = self.inner.queue.lock().expect("scheduler queue poisoned");
            queue.pop_front()
        };
        match reaction {
            Some(reaction) => {
                reaction();
                true
            }
            None => false,
        }
    }

    /// Drains the queue, including reactions enqueued while draining.
    ///
    /// Returns the number of reactions run. The queue lock is never held
    /// while a reaction runs, so reactions are free to schedule more work
    /// or settle further promises.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        while self.tick() {
            ran += 1;
        }
        ran
    }

    /// Returns the number of queued reactions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.queue.lock().expect("scheduler queue poisoned").len()
    }

    /// Returns true if no reactions are queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the diagnostic collector shared by everything built on this
    /// scheduler.
    #[must_use]
    pub fn collector(&self) -> &Arc<LogCollector> {
        &self.inner.collector
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler").field("queued", &self.len()).finish()
    }
}
