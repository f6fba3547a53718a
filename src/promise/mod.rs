//! The deferred settlement primitive.
//!
//! A [`Promise`] is a handle to a value that is not available yet. It is
//! created pending, settles exactly once (fulfilled with a value or
//! rejected with an error), and is immutable afterwards. Reactions attached
//! with [`chain`](Promise::chain), [`then`](Promise::then) or
//! [`catch_error`](Promise::catch_error) run on the owning context's
//! [`Scheduler`] strictly after the attaching call returns, in attachment
//! order.
//!
//! The settlement capability is the separate [`Resolver`], handed out only
//! by the creating call. Cloning a resolver is cheap and racing clones are
//! safe: the first settlement wins and every later attempt is a no-op.
//!
//! ```
//! use vow::promise::Promise;
//! use vow::runtime::Scheduler;
//!
//! let scheduler = Scheduler::new();
//! let (promise, resolver) = Promise::<i32>::with_resolver(&scheduler);
//!
//! let doubled = promise.then(|v| vow::promise::Step::Now(v * 2));
//! resolver.fulfill(21);
//!
//! scheduler.run_until_idle();
//! assert_eq!(doubled.settlement().unwrap().into_result().unwrap(), 42);
//! ```

mod chain;
mod future;
mod shared;

pub use chain::Step;
pub use future::PromiseFuture;

use crate::error::Error;
use crate::runtime::Scheduler;
use crate::types::{PromiseId, Settlement};
use shared::Shared;

/// A handle to the eventual outcome of a deferred operation.
///
/// Clones share the same settlement state. Values and errors must be
/// `Clone` because one settlement can feed any number of reactions and
/// handles.
pub struct Promise<T, E = Error> {
    pub(crate) shared: Shared<T, E>,
}

impl<T, E> Clone for Promise<T, E> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

/// The settlement capability of one promise.
///
/// Obtainable only from the call that created the promise. `fulfill` and
/// `reject` transition the promise at most once between them; whichever
/// arrives first wins and the rest are silent no-ops.
pub struct Resolver<T, E = Error> {
    shared: Shared<T, E>,
}

impl<T, E> Clone for Resolver<T, E> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<T, E> Promise<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    /// Creates a pending promise and its resolver.
    #[must_use]
    pub fn with_resolver(scheduler: &Scheduler) -> (Self, Resolver<T, E>) {
        let shared = Shared::new(scheduler);
        (
            Self {
                shared: shared.clone(),
            },
            Resolver { shared },
        )
    }

    /// Executor-style construction.
    ///
    /// The executor runs synchronously with the resolver and starts
    /// whatever deferred work will settle the promise. Returning `Err`
    /// rejects the promise immediately after construction; invalid input
    /// is reported this way rather than panicking past the caller.
    ///
    /// If the executor already settled the promise, a subsequent `Err`
    /// return is a no-op like any other late settlement.
    pub fn new(
        scheduler: &Scheduler,
        executor: impl FnOnce(Resolver<T, E>) -> Result<(), E>,
    ) -> Self {
        let (promise, resolver) = Self::with_resolver(scheduler);
        if let Err(error) = executor(resolver.clone()) {
            resolver.reject(error);
        }
        promise
    }

    /// Creates an already-fulfilled promise.
    #[must_use]
    pub fn fulfilled(scheduler: &Scheduler, value: T) -> Self {
        let (promise, resolver) = Self::with_resolver(scheduler);
        resolver.fulfill(value);
        promise
    }

    /// Creates an already-rejected promise.
    #[must_use]
    pub fn rejected(scheduler: &Scheduler, error: E) -> Self {
        let (promise, resolver) = Self::with_resolver(scheduler);
        resolver.reject(error);
        promise
    }

    /// Returns this promise's diagnostic id.
    #[must_use]
    pub fn id(&self) -> PromiseId {
        self.shared.id()
    }

    /// Returns the scheduler this promise's reactions run on.
    #[must_use]
    pub fn scheduler(&self) -> Scheduler {
        self.shared.scheduler()
    }

    /// Returns true while unsettled.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.shared.is_pending()
    }

    /// Snapshot of the settled outcome, or `None` while pending.
    #[must_use]
    pub fn settlement(&self) -> Option<Settlement<T, E>> {
        self.shared.settlement()
    }

    /// Registers a raw reaction on this promise.
    ///
    /// The reaction runs exactly once with a clone of the settled outcome,
    /// on the owning scheduler, never inside this call, even when the
    /// promise is already settled.
    pub(crate) fn subscribe(&self, reaction: impl FnOnce(Settlement<T, E>) + Send + 'static) {
        self.shared.subscribe(reaction);
    }
}

impl<T, E> Resolver<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    /// Settles the promise as fulfilled. No-op if already settled.
    pub fn fulfill(&self, value: T) {
        self.shared.settle(Settlement::Fulfilled(value));
    }

    /// Settles the promise as rejected. No-op if already settled.
    pub fn reject(&self, error: E) {
        self.shared.settle(Settlement::Rejected(error));
    }

    /// Settles the promise with a prepared settlement. No-op if already
    /// settled.
    pub fn settle(&self, settlement: Settlement<T, E>) {
        self.shared.settle(settlement);
    }
}
