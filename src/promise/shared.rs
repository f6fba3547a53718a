//! Shared settlement state behind every promise handle.
//!
//! All handles onto one promise (the `Promise` clones, the `Resolver`
//! clones, and any pending await) point at one `Shared` cell. Settlement is
//! first-caller-wins: the transition out of `Pending` happens exactly once,
//! under the state lock, and every later attempt is a silent no-op. That
//! makes racing producers (two worker callbacks settling the same promise)
//! safe without any protocol between them.

use std::sync::{Arc, Mutex};
use std::task::Waker;

use crate::observability::LogEntry;
use crate::runtime::Scheduler;
use crate::types::{PromiseId, Settlement};

type Reaction<T, E> = Box<dyn FnOnce(Settlement<T, E>) + Send + 'static>;

enum State<T, E> {
    Pending,
    Fulfilled(T),
    Rejected(E),
}

struct Inner<T, E> {
    id: PromiseId,
    state: State<T, E>,
    /// Reactions registered while pending, in insertion order.
    reactions: Vec<Reaction<T, E>>,
    /// Wakers parked by `.await`s on this promise.
    wakers: Vec<Waker>,
    /// Whether anything capable of seeing a rejection ever attached.
    rejection_observed: bool,
    scheduler: Scheduler,
}

impl<T, E> Drop for Inner<T, E> {
    fn drop(&mut self) {
        if matches!(self.state, State::Rejected(_)) && !self.rejection_observed {
            self.scheduler.collector().record(
                LogEntry::warn("unhandled rejection")
                    .with_field("promise", self.id.to_string()),
            );
        }
    }
}

/// Reference-counted shared state of one promise.
pub(crate) struct Shared<T, E> {
    inner: Arc<Mutex<Inner<T, E>>>,
}

impl<T, E> Clone for Shared<T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T, E> Shared<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    pub(crate) fn new(scheduler: &Scheduler) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                id: PromiseId::next(),
                state: State::Pending,
                reactions: Vec::new(),
                wakers: Vec::new(),
                rejection_observed: false,
                scheduler: scheduler.clone(),
            })),
        }
    }

    pub(crate) fn id(&self) -> PromiseId {
        self.lock().id
    }

    pub(crate) fn scheduler(&self) -> Scheduler {
        self.lock().scheduler.clone()
    }

    /// First-caller-wins settlement. Moves every registered reaction onto
    /// the scheduler with a clone of the outcome and wakes parked awaiters.
    /// Returns false if the promise was already settled.
    pub(crate) fn settle(&self, settlement: Settlement<T, E>) -> bool {
        let (reactions, wakers, scheduler) = {
            let mut inner = self.lock();
            if !matches!(inner.state, State::Pending) {
                return false;
            }
            inner.state = match settlement.clone() {
                Settlement::Fulfilled(v) => State::Fulfilled(v),
                Settlement::Rejected(e) => State::Rejected(e),
            };
            (
                std::mem::take(&mut inner.reactions),
                std::mem::take(&mut inner.wakers),
                inner.scheduler.clone(),
            )
        };
        for reaction in reactions {
            let outcome = settlement.clone();
            scheduler.schedule(move || reaction(outcome));
        }
        for waker in wakers {
            waker.wake();
        }
        true
    }

    /// Registers a reaction. While pending it is stored in insertion order;
    /// after settlement it is scheduled immediately with the stored
    /// outcome. Either way the reaction runs only once the owning context
    /// drains its scheduler, never inside this call.
    pub(crate) fn subscribe(&self, reaction: impl FnOnce(Settlement<T, E>) + Send + 'static) {
        let (outcome, scheduler) = {
            let mut inner = self.lock();
            inner.rejection_observed = true;
            match &inner.state {
                State::Pending => {
                    inner.reactions.push(Box::new(reaction));
                    return;
                }
                State::Fulfilled(v) => (Settlement::Fulfilled(v.clone()), inner.scheduler.clone()),
                State::Rejected(e) => (Settlement::Rejected(e.clone()), inner.scheduler.clone()),
            }
        };
        scheduler.schedule(move || reaction(outcome));
    }

    /// Snapshot of the settled outcome, if any.
    pub(crate) fn settlement(&self) -> Option<Settlement<T, E>> {
        let inner = self.lock();
        match &inner.state {
            State::Pending => None,
            State::Fulfilled(v) => Some(Settlement::Fulfilled(v.clone())),
            State::Rejected(e) => Some(Settlement::Rejected(e.clone())),
        }
    }

    pub(crate) fn is_pending(&self) -> bool {
        matches!(self.lock().state, State::Pending)
    }

    /// Marks the rejection as observed without attaching a reaction.
    /// Used by the await path, where the rejection surfaces as an `Err`.
    pub(crate) fn mark_observed(&self) {
        self.lock().rejection_observed = true;
    }

    /// Parks a waker to be woken at settlement. Returns the settled
    /// outcome instead if settlement already happened.
    pub(crate) fn park(&self, waker: &Waker) -> Option<Settlement<T, E>> {
        let mut inner = self.lock();
        match &inner.state {
            State::Pending => {
                if !inner.wakers.iter().any(|w| w.will_wake(waker)) {
                    inner.wakers.push(waker.clone());
                }
                None
            }
            State::Fulfilled(v) => Some(Settlement::Fulfilled(v.clone())),
            State::Rejected(e) => Some(Settlement::Rejected(e.clone())),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner<T, E>> {
        self.inner.lock().expect("promise state poisoned")
    }
}
