//! The chain operator: derived promises with flattening.
//!
//! Chaining attaches handlers to a promise and yields a derived promise
//! settled from what the handlers return. A handler answers with a
//! [`Step`]: a plain value settles the derived promise directly, a typed
//! failure rejects it, and another promise is adopted: the derived
//! promise settles only when the inner one does, with the same outcome.
//! Adoption never double-wraps; an adoption cycle is a caller error and
//! simply never settles.

use crate::types::Settlement;

use super::{Promise, Resolver};

/// What a chain handler produces.
#[must_use = "a step does nothing until returned to the chain operator"]
pub enum Step<T, E> {
    /// Settle the derived promise with this value now.
    Now(T),
    /// Reject the derived promise with this error now.
    Fail(E),
    /// Adopt another promise's eventual outcome (flattening).
    Defer(Promise<T, E>),
}

impl<T, E> From<Result<T, E>> for Step<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(v) => Self::Now(v),
            Err(e) => Self::Fail(e),
        }
    }
}

/// Drives a resolver from a handler's step, adopting deferred promises.
fn apply_step<T, E>(step: Step<T, E>, resolver: Resolver<T, E>)
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    match step {
        Step::Now(value) => resolver.fulfill(value),
        Step::Fail(error) => resolver.reject(error),
        Step::Defer(inner) => {
            inner.subscribe(move |outcome| resolver.settle(outcome));
        }
    }
}

impl<T, E> Promise<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    /// Attaches a success handler and a failure handler, returning the
    /// derived promise.
    ///
    /// Exactly one handler runs, with the settled value or error; its
    /// [`Step`] settles the derived promise. Handlers run on the owning
    /// scheduler, never inside this call.
    pub fn chain<U, F, G>(&self, on_fulfilled: F, on_rejected: G) -> Promise<U, E>
    where
        U: Clone + Send + 'static,
        F: FnOnce(T) -> Step<U, E> + Send + 'static,
        G: FnOnce(E) -> Step<U, E> + Send + 'static,
    {
        let (derived, resolver) = Promise::with_resolver(&self.scheduler());
        self.subscribe(move |outcome| match outcome {
            Settlement::Fulfilled(value) => apply_step(on_fulfilled(value), resolver),
            Settlement::Rejected(error) => apply_step(on_rejected(error), resolver),
        });
        derived
    }

    /// Attaches a success handler only; rejection propagates unchanged to
    /// the derived promise.
    pub fn then<U, F>(&self, on_fulfilled: F) -> Promise<U, E>
    where
        U: Clone + Send + 'static,
        F: FnOnce(T) -> Step<U, E> + Send + 'static,
    {
        let (derived, resolver) = Promise::with_resolver(&self.scheduler());
        self.subscribe(move |outcome| match outcome {
            Settlement::Fulfilled(value) => apply_step(on_fulfilled(value), resolver),
            Settlement::Rejected(error) => resolver.reject(error),
        });
        derived
    }

    /// Attaches a failure handler only; fulfillment propagates unchanged
    /// to the derived promise.
    ///
    /// Equivalent to [`chain`](Self::chain) with an identity success
    /// handler: the single error-handling site for everything upstream.
    pub fn catch_error<G>(&self, on_rejected: G) -> Promise<T, E>
    where
        G: FnOnce(E) -> Step<T, E> + Send + 'static,
    {
        let (derived, resolver) = Promise::with_resolver(&self.scheduler());
        self.subscribe(move |outcome| match outcome {
            Settlement::Fulfilled(value) => resolver.fulfill(value),
            Settlement::Rejected(error) => apply_step(on_rejected(error), resolver),
        });
        derived
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::Scheduler;

    #[test]
    fn then_transforms_value() {
        let scheduler = Scheduler::new();
        let promise = Promise::<i32, &str>::fulfilled(&scheduler, 10);
        let derived = promise.then(|v| Step::Now(v + 1));

        scheduler.run_until_idle();
        assert_eq!(derived.settlement(), Some(Settlement::Fulfilled(11)));
    }

    #[test]
    fn then_propagates_rejection_unchanged() {
        let scheduler = Scheduler::new();
        let promise = Promise::<i32, &str>::rejected(&scheduler, "boom");
        let derived = promise.then(|v| Step::Now(v + 1));
        let caught = derived.catch_error(|e| Step::Fail(e));

        scheduler.run_until_idle();
        assert_eq!(caught.settlement(), Some(Settlement::Rejected("boom")));
    }

    #[test]
    fn catch_error_recovers() {
        let scheduler = Scheduler::new();
        let promise = Promise::<i32, &str>::rejected(&scheduler, "boom");
        let recovered = promise.catch_error(|_e| Step::Now(0));

        scheduler.run_until_idle();
        assert_eq!(recovered.settlement(), Some(Settlement::Fulfilled(0)));
    }

    #[test]
    fn catch_error_passes_fulfillment_through() {
        let scheduler = Scheduler::new();
        let promise = Promise::<i32, &str>::fulfilled(&scheduler, 3);
        let derived = promise.catch_error(|_e| Step::Now(0));

        scheduler.run_until_idle();
        assert_eq!(derived.settlement(), Some(Settlement::Fulfilled(3)));
    }

    #[test]
    fn handler_failure_rejects_derived() {
        let scheduler = Scheduler::new();
        let promise = Promise::<i32, &str>::fulfilled(&scheduler, 1);
        let derived = promise.then(|_v| Step::<i32, &str>::Fail("handler failed"));
        let caught = derived.catch_error(|e| Step::Fail(e));

        scheduler.run_until_idle();
        assert_eq!(caught.settlement(), Some(Settlement::Rejected("handler failed")));
    }

    #[test]
    fn defer_flattens_pending_promise() {
        let scheduler = Scheduler::new();
        let outer = Promise::<i32, &str>::fulfilled(&scheduler, 1);

        let (inner, inner_resolver) = Promise::<i32, &str>::with_resolver(&scheduler);
        let derived = outer.then(move |_v| Step::Defer(inner));

        // The outer handler has run; the derived promise now tracks the
        // still-pending inner promise.
        scheduler.run_until_idle();
        assert!(derived.is_pending());

        inner_resolver.fulfill(99);
        scheduler.run_until_idle();
        assert_eq!(derived.settlement(), Some(Settlement::Fulfilled(99)));
    }

    #[test]
    fn defer_adopts_rejection() {
        let scheduler = Scheduler::new();
        let outer = Promise::<i32, &str>::fulfilled(&scheduler, 1);
        let inner = Promise::<i32, &str>::rejected(&scheduler, "inner boom");
        let derived = outer.then(move |_v| Step::Defer(inner));
        let caught = derived.catch_error(|e| Step::Fail(e));

        scheduler.run_until_idle();
        assert_eq!(caught.settlement(), Some(Settlement::Rejected("inner boom")));
    }

    #[test]
    fn chain_runs_exactly_one_handler() {
        let scheduler = Scheduler::new();
        let promise = Promise::<i32, &str>::rejected(&scheduler, "boom");
        let derived = promise.chain(
            |_v| Step::Now("fulfilled path"),
            |_e| Step::Now("rejected path"),
        );

        scheduler.run_until_idle();
        assert_eq!(
            derived.settlement(),
            Some(Settlement::Fulfilled("rejected path"))
        );
    }

    #[test]
    fn reactions_run_in_attachment_order() {
        let scheduler = Scheduler::new();
        let (promise, resolver) = Promise::<i32, &str>::with_resolver(&scheduler);
        let seen = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));

        for label in ["first", "second", "third"] {
            let seen = std::sync::Arc::clone(&seen);
            let _ = promise.then(move |v| {
                seen.lock().unwrap().push(label);
                Step::<i32, &str>::Now(v)
            });
        }

        resolver.fulfill(0);
        scheduler.run_until_idle();
        assert_eq!(*seen.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn step_from_result() {
        let ok: Step<i32, &str> = Ok(1).into();
        assert!(matches!(ok, Step::Now(1)));
        let err: Step<i32, &str> = Err("e").into();
        assert!(matches!(err, Step::Fail("e")));
    }
}
