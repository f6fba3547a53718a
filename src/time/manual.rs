//! Virtual-time timer for deterministic tests.

use std::sync::Mutex;
use std::time::Duration;

use crate::error::Error;
use crate::promise::{Promise, Resolver};
use crate::runtime::Scheduler;
use crate::time::Timer;

struct Alarm {
    due: Duration,
    /// Registration order, the tiebreak for alarms due at the same
    /// instant.
    seq: u64,
    resolver: Resolver<(), Error>,
}

/// A timer on virtual time.
///
/// Nothing fires on its own; [`advance`](Self::advance) moves the clock
/// and fulfills every alarm that has come due, in due-time order with
/// registration order as the tiebreak. Same advances, same settlements,
/// every run.
pub struct ManualTimer {
    state: Mutex<ManualState>,
}

struct ManualState {
    now: Duration,
    next_seq: u64,
    alarms: Vec<Alarm>,
}

impl ManualTimer {
    /// Creates a timer at virtual time zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ManualState {
                now: Duration::ZERO,
                next_seq: 0,
                alarms: Vec::new(),
            }),
        }
    }

    /// The current virtual time.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.lock().now
    }

    /// Number of alarms not yet due.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.lock().alarms.len()
    }

    /// Moves the clock forward and fulfills every alarm that came due.
    pub fn advance(&self, by: Duration) {
        let due = {
            let mut state = self.lock();
            state.now += by;
            let now = state.now;
            let mut due: Vec<Alarm> = Vec::new();
            let mut keep: Vec<Alarm> = Vec::new();
            for alarm in state.alarms.drain(..) {
                if alarm.due <= now {
                    due.push(alarm);
                } else {
                    keep.push(alarm);
                }
            }
            state.alarms = keep;
            due.sort_by_key(|alarm| (alarm.due, alarm.seq));
            due
        };
        // Settle outside the lock: fulfill only enqueues reactions.
        for alarm in due {
            alarm.resolver.fulfill(());
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ManualState> {
        self.state.lock().expect("manual timer poisoned")
    }
}

impl Default for ManualTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer for ManualTimer {
    fn after(&self, scheduler: &Scheduler, delay: Duration) -> Promise<(), Error> {
        let (promise, resolver) = Promise::with_resolver(scheduler);
        let mut state = self.lock();
        let due = state.now + delay;
        let seq = state.next_seq;
        state.next_seq += 1;
        state.alarms.push(Alarm { due, seq, resolver });
        promise
    }
}

impl std::fmt::Debug for ManualTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("ManualTimer")
            .field("now", &state.now)
            .field("pending", &state.alarms.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Settlement;

    #[test]
    fn fires_in_due_order() {
        let scheduler = Scheduler::new();
        let timer = ManualTimer::new();

        let slow = timer.after(&scheduler, Duration::from_millis(20));
        let fast = timer.after(&scheduler, Duration::from_millis(10));

        timer.advance(Duration::from_millis(15));
        scheduler.run_until_idle();
        assert_eq!(fast.settlement(), Some(Settlement::Fulfilled(())));
        assert!(slow.is_pending());

        timer.advance(Duration::from_millis(5));
        scheduler.run_until_idle();
        assert_eq!(slow.settlement(), Some(Settlement::Fulfilled(())));
    }

    #[test]
    fn zero_delay_fires_on_the_next_advance() {
        let scheduler = Scheduler::new();
        let timer = ManualTimer::new();
        let promise = timer.after(&scheduler, Duration::ZERO);

        assert!(promise.is_pending());
        timer.advance(Duration::ZERO);
        scheduler.run_until_idle();
        assert_eq!(promise.settlement(), Some(Settlement::Fulfilled(())));
    }

    #[test]
    fn equal_due_times_fire_in_registration_order() {
        let scheduler = Scheduler::new();
        let timer = ManualTimer::new();
        let seen = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));

        for label in ["a", "b"] {
            let seen = std::sync::Arc::clone(&seen);
            let _ = timer
                .after(&scheduler, Duration::from_millis(10))
                .then(move |()| {
                    seen.lock().unwrap().push(label);
                    crate::promise::Step::<(), Error>::Now(())
                });
        }

        timer.advance(Duration::from_millis(10));
        scheduler.run_until_idle();
        assert_eq!(*seen.lock().unwrap(), vec!["a", "b"]);
    }
}
