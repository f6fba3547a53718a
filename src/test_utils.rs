//! Test utilities.
//!
//! Shared helpers for unit and integration tests:
//! - Consistent tracing-based logging initialization
//! - A blocking await for promises settled from other threads
//! - A drive loop interleaving scheduler drains with port pumping
//!
//! # Example
//! ```
//! use vow::promise::Promise;
//! use vow::runtime::Scheduler;
//! use vow::test_utils::{init_test_logging, run_settled};
//!
//! init_test_logging();
//! let scheduler = Scheduler::new();
//! let promise = Promise::<i32, &str>::fulfilled(&scheduler, 4);
//! assert_eq!(run_settled(promise), Ok(4));
//! ```

use std::future::IntoFuture;
use std::sync::Once;
use std::time::{Duration, Instant};

use crate::channel::Port;
use crate::promise::Promise;
use crate::runtime::Scheduler;

static INIT_LOGGING: Once = Once::new();

/// Initialize test logging with debug-level output.
///
/// Safe to call multiple times; only initializes once.
pub fn init_test_logging() {
    init_test_logging_with_level(tracing::Level::DEBUG);
}

/// Initialize test logging with a custom level.
///
/// The first call wins; later calls are no-ops.
pub fn init_test_logging_with_level(level: tracing::Level) {
    INIT_LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(true)
            .with_ansi(false)
            .try_init();
    });
}

/// Blocks the test thread until the promise settles, returning the
/// outcome as a `Result`.
///
/// Settlement must come from somewhere else (a worker, a timer thread, a
/// prior drain); this helper only parks.
pub fn run_settled<T, E>(promise: Promise<T, E>) -> Result<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    futures_lite::future::block_on(promise.into_future())
}

/// Drives a context (drain reactions, pump the port) until `done` returns
/// true or `deadline` elapses. Returns whether `done` was reached.
pub fn drive_until(
    scheduler: &Scheduler,
    port: &mut Port,
    deadline: Duration,
    mut done: impl FnMut() -> bool,
) -> bool {
    let start = Instant::now();
    loop {
        scheduler.run_until_idle();
        if done() {
            return true;
        }
        if start.elapsed() > deadline {
            return false;
        }
        port.pump_blocking(Duration::from_millis(5));
    }
}
