//! Isolated worker contexts.
//!
//! A worker is an OS thread with private state: its own [`Scheduler`] and
//! the far end of a port pair. Nothing else is shared; the only way in or
//! out is a posted message. The spawning side keeps the near port and
//! drives it however it likes; the worker side runs a fixed loop that
//! interleaves inbound delivery with reaction draining until the channel
//! closes.
//!
//! There is no forcible termination. A worker stops in one of two ways:
//! the spawning side drops the near port (the worker sees `Closed`,
//! finishes its queued reactions, and returns), or worker code raises the
//! loop's own [`StopSignal`] and the loop winds down the same way.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::channel::{self, Port, PortSender};
use crate::runtime::Scheduler;

/// How long the worker loop waits for a frame before rechecking its
/// reaction queue. Reactions settled from other threads (timers, nested
/// workers) flow within this cadence even when no frames arrive.
const PUMP_INTERVAL: Duration = Duration::from_millis(10);

/// Cooperative stop flag for a worker loop.
///
/// There is no forcible cancellation; a worker that should exit early
/// checks (or is handed) one of these. Once raised, the loop finishes
/// the current delivery, drains its reactions, and returns, which closes
/// the channel toward the spawning side.
#[derive(Clone, Debug)]
pub struct StopSignal {
    flag: Arc<AtomicBool>,
}

impl StopSignal {
    fn new() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Raises the flag. Idempotent.
    pub fn stop(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Returns true once raised.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Capabilities handed to a worker's init closure.
pub struct WorkerContext {
    scheduler: Scheduler,
    sender: PortSender,
    stop: StopSignal,
}

impl WorkerContext {
    /// The worker's private scheduler.
    #[must_use]
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// A posting handle toward the spawning side, usable from inside
    /// inbound handlers.
    #[must_use]
    pub fn sender(&self) -> PortSender {
        self.sender.clone()
    }

    /// The loop's stop flag, cloneable into handlers.
    #[must_use]
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }
}

/// Handle to a spawned worker thread.
#[derive(Debug)]
pub struct Worker {
    name: String,
    join: Option<thread::JoinHandle<()>>,
}

impl Worker {
    /// Spawns a worker thread and returns its handle plus the near port.
    ///
    /// `init` runs once on the worker thread before the delivery loop; it
    /// registers the worker's inbound behavior on the far port (typically
    /// an rpc dispatcher) using the capabilities in [`WorkerContext`].
    ///
    /// # Errors
    ///
    /// Returns an error when the OS refuses to spawn the thread.
    pub fn spawn(
        name: impl Into<String>,
        init: impl FnOnce(&WorkerContext, &mut Port) + Send + 'static,
    ) -> io::Result<(Self, Port)> {
        let name = name.into();
        let (near, far) = channel::pair();

        let join = thread::Builder::new().name(name.clone()).spawn(move || {
            let scheduler = Scheduler::new();
            let mut port = far;
            let context = WorkerContext {
                scheduler: scheduler.clone(),
                sender: port.sender(),
                stop: StopSignal::new(),
            };
            let stop = context.stop_signal();
            init(&context, &mut port);

            while port.is_open() && !stop.is_stopped() {
                port.pump_blocking(PUMP_INTERVAL);
                scheduler.run_until_idle();
            }
            // Channel closed or stop raised: finish whatever settled
            // during teardown. Returning drops the far port, which is the
            // Closed event the spawning side observes.
            scheduler.run_until_idle();
        })?;

        Ok((
            Self {
                name,
                join: Some(join),
            },
            near,
        ))
    }

    /// The worker thread's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Waits for the worker loop to return.
    ///
    /// The loop only returns once the channel has closed, so drop the
    /// near port first.
    pub fn join(mut self) {
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}
