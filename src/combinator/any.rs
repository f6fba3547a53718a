//! The `any` combinator: first fulfillment wins.

use core::fmt;
use std::sync::{Arc, Mutex};

use crate::promise::Promise;
use crate::runtime::Scheduler;
use crate::types::Settlement;

/// Error produced when every input of [`any`] rejected.
///
/// Carries each input's error in **input order**, independent of the
/// order the rejections arrived in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateError<E> {
    errors: Vec<E>,
}

impl<E> AggregateError<E> {
    /// Creates an aggregate from per-input errors in input order.
    #[must_use]
    pub fn new(errors: Vec<E>) -> Self {
        Self { errors }
    }

    /// Returns the per-input errors in input order.
    #[must_use]
    pub fn errors(&self) -> &[E] {
        &self.errors
    }

    /// Consumes the aggregate, returning the errors in input order.
    #[must_use]
    pub fn into_errors(self) -> Vec<E> {
        self.errors
    }

    /// Returns the number of aggregated errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns true for the empty-input aggregate.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

impl<E: fmt::Display> fmt::Display for AggregateError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.is_empty() {
            return write!(f, "no inputs to settle");
        }
        write!(f, "all {} inputs rejected: ", self.errors.len())?;
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for AggregateError<E> {}

struct Progress<E> {
    /// One slot per input, filled as rejections arrive.
    errors: Vec<Option<E>>,
    remaining: usize,
}

/// Reduces an ordered sequence of promises to the first value any of them
/// fulfills with.
///
/// - Fulfills with whichever input fulfills first **by completion time**
///   (input order does not matter for the winner).
/// - Rejects only once every input has rejected, with an
///   [`AggregateError`] carrying the errors in input order.
/// - An empty sequence rejects immediately with an empty aggregate.
pub fn any<T, E>(
    scheduler: &Scheduler,
    promises: impl IntoIterator<Item = Promise<T, E>>,
) -> Promise<T, AggregateError<E>>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    let inputs: Vec<Promise<T, E>> = promises.into_iter().collect();
    let (derived, resolver) = Promise::with_resolver(scheduler);

    if inputs.is_empty() {
        resolver.reject(AggregateError::new(Vec::new()));
        return derived;
    }

    let progress = Arc::new(Mutex::new(Progress {
        errors: (0..inputs.len()).map(|_| None).collect(),
        remaining: inputs.len(),
    }));

    for (index, input) in inputs.into_iter().enumerate() {
        let progress = Arc::clone(&progress);
        let resolver = resolver.clone();
        input.subscribe(move |outcome| match outcome {
            // First fulfillment wins; later settlements are no-ops.
            Settlement::Fulfilled(value) => resolver.fulfill(value),
            Settlement::Rejected(error) => {
                let mut progress = progress.lock().expect("any progress poisoned");
                progress.errors[index] = Some(error);
                progress.remaining -= 1;
                if progress.remaining == 0 {
                    let errors = progress
                        .errors
                        .iter_mut()
                        .map(|slot| slot.take().expect("every slot filled"))
                        .collect();
                    resolver.reject(AggregateError::new(errors));
                }
            }
        });
    }

    derived
}
