//! Await support: suspension as sugar over settlement.
//!
//! Awaiting a promise parks the task's waker in the shared state; the
//! resolver wakes it at settlement and the poll returns the outcome as a
//! `Result`. The rejection surfaces at the await point, so an awaited
//! promise counts as observed for the unhandled-rejection diagnostic.
//!
//! Only the awaiting task suspends. The thread keeps draining other
//! reactions and channel deliveries; nothing here blocks.

use std::future::{Future, IntoFuture};
use std::pin::Pin;
use std::task::{Context, Poll};

use super::shared::Shared;
use super::Promise;

/// Future adapter for a promise, created by awaiting it.
pub struct PromiseFuture<T, E> {
    shared: Shared<T, E>,
}

impl<T, E> Future for PromiseFuture<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    type Output = Result<T, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match self.shared.park(cx.waker()) {
            Some(settlement) => Poll::Ready(settlement.into_result()),
            None => Poll::Pending,
        }
    }
}

impl<T, E> IntoFuture for Promise<T, E>
where
    T: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    type Output = Result<T, E>;
    type IntoFuture = PromiseFuture<T, E>;

    fn into_future(self) -> Self::IntoFuture {
        self.shared.mark_observed();
        PromiseFuture {
            shared: self.shared.clone(),
        }
    }
}
