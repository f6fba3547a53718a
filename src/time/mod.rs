//! Timer collaborator interface and time-based compositions.
//!
//! The core has no timer of its own; it consumes one through the
//! [`Timer`] trait. What it does provide are the compositions the trait
//! makes possible:
//!
//! - [`alarm`]: validated delay → message, the executor-construction
//!   example in promise form
//! - [`timeout`]: race a target promise against a timer-backed rejection;
//!   first settlement wins because settlement is idempotent, so no
//!   cancellation primitive is needed
//!
//! [`ManualTimer`] is the deterministic test double: virtual time,
//! advanced explicitly.

mod manual;

pub use manual::ManualTimer;

use std::time::Duration;

use crate::error::Error;
use crate::promise::{Promise, Step};
use crate::runtime::Scheduler;
use crate::types::Settlement;

/// A deferred-delay service.
pub trait Timer: Send + Sync {
    /// Returns a promise that fulfills with `()` once `delay` has passed.
    fn after(&self, scheduler: &Scheduler, delay: Duration) -> Promise<(), Error>;
}

/// Returns a promise of a wake-up message after `delay_ms` milliseconds.
///
/// A negative delay is invalid synchronous input: the returned promise is
/// already rejected with a validation error and no deferred work starts.
pub fn alarm(
    timer: &dyn Timer,
    scheduler: &Scheduler,
    person: &str,
    delay_ms: i64,
) -> Promise<String, Error> {
    let person = person.to_string();
    if delay_ms < 0 {
        return Promise::rejected(
            scheduler,
            Error::validation("alarm delay must not be negative"),
        );
    }
    timer
        .after(scheduler, Duration::from_millis(delay_ms as u64))
        .then(move |()| Step::Now(format!("Wake up, {person}!")))
}

/// Bounds a promise with a deadline.
///
/// The derived promise settles with the target's outcome if the target
/// settles first, and rejects with `on_timeout()` if the delay fires
/// first. The loser's later settlement is a no-op; the target itself is
/// not cancelled (there is no cancellation primitive) and keeps running.
pub fn timeout<T, E>(
    target: &Promise<T, E>,
    timer: &dyn Timer,
    delay: Duration,
    on_timeout: impl FnOnce() -> E + Send + 'static,
) -> Promise<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    let scheduler = target.scheduler();
    let (derived, resolver) = Promise::with_resolver(&scheduler);

    let winner = resolver.clone();
    target.subscribe(move |outcome| winner.settle(outcome));

    timer.after(&scheduler, delay).subscribe(move |outcome| {
        if let Settlement::Fulfilled(()) = outcome {
            resolver.reject(on_timeout());
        }
        // A failed timer never times anything out; the target decides.
    });

    derived
}
