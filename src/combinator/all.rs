//! The `all` combinator: every input must fulfill.

use std::sync::{Arc, Mutex};

use crate::promise::Promise;
use crate::runtime::Scheduler;
use crate::types::Settlement;

struct Progress<T> {
    /// One slot per input, filled as fulfillments arrive.
    slots: Vec<Option<T>>,
    remaining: usize,
}

/// Reduces an ordered sequence of promises to a promise of the ordered
/// sequence of their values.
///
/// - Fulfills once every input has fulfilled; the result vector preserves
///   **input order**, whatever the completion order was.
/// - Rejects with the first rejection, verbatim, as soon as it arrives;
///   the remaining inputs keep running but their outcomes are discarded
///   here.
/// - An empty sequence fulfills immediately with an empty vector.
pub fn all<T, E>(
    scheduler: &Scheduler,
    promises: impl IntoIterator<Item = Promise<T, E>>,
) -> Promise<Vec<T>, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    let inputs: Vec<Promise<T, E>> = promises.into_iter().collect();
    let (derived, resolver) = Promise::with_resolver(scheduler);

    if inputs.is_empty() {
        resolver.fulfill(Vec::new());
        return derived;
    }

    let progress = Arc::new(Mutex::new(Progress {
        slots: (0..inputs.len()).map(|_| None).collect(),
        remaining: inputs.len(),
    }));

    for (index, input) in inputs.into_iter().enumerate() {
        let progress = Arc::clone(&progress);
        let resolver = resolver.clone();
        input.subscribe(move |outcome| match outcome {
            Settlement::Fulfilled(value) => {
                let mut progress = progress.lock().expect("all progress poisoned");
                progress.slots[index] = Some(value);
                progress.remaining -= 1;
                if progress.remaining == 0 {
                    let values = progress
                        .slots
                        .iter_mut()
                        .map(|slot| slot.take().expect("every slot filled"))
                        .collect();
                    resolver.fulfill(values);
                }
            }
            // First rejection wins; later settlements are no-ops.
            Settlement::Rejected(error) => resolver.reject(error),
        });
    }

    derived
}
