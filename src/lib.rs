//! Vow: deferred settlement primitives with worker offload.
//!
//! # Overview
//!
//! Vow is built around two coupled ideas. A [`Promise`](promise::Promise)
//! is a handle to a value that is not available yet: created pending,
//! settled exactly once, immutable afterwards, with reactions that run on
//! a FIFO [`Scheduler`](runtime::Scheduler) strictly after the code that
//! attached them returns. A [`Port`](channel::Port) pair connects two
//! contexts that share nothing, delivering serialized messages in order,
//! and the [`rpc`] adapter turns a port round-trip back into a promise
//! using correlation ids. That is how long-running work moves onto a
//! [`Worker`](worker::Worker) without ever blocking the caller.
//!
//! # Core Guarantees
//!
//! - **Single settlement**: the pending → settled transition happens once;
//!   every later attempt is a silent no-op, so racing producers are safe
//! - **Deferred reactions**: no reaction runs inside the call that
//!   attached it or settled its promise; same-turn reactions run in
//!   attachment order
//! - **Ordered delivery**: messages posted A-then-B arrive A-then-B;
//!   termination and malformed frames surface as distinguishable events
//!   instead of hanging the receiver
//! - **Bounded pending state**: a request's table entry is removed exactly
//!   when its promise settles, including rejection en masse at channel
//!   close
//!
//! # Module Structure
//!
//! - [`types`]: identifiers and the two-valued settlement outcome
//! - [`error`]: the error taxonomy (validation, remote, transport,
//!   aggregate)
//! - [`runtime`]: the FIFO reaction scheduler
//! - [`promise`]: the settlement primitive, chaining, await support
//! - [`combinator`]: `all` and `any`
//! - [`channel`]: port pairs between isolated contexts
//! - [`worker`]: worker threads with private schedulers
//! - [`rpc`]: the request/response adapter and command dispatcher
//! - [`time`]: timer collaborator interface, `alarm`, `timeout`
//! - [`io`]: fetch-like and event-source collaborator interfaces
//! - [`observability`]: structured logging and diagnostics
//! - [`test_utils`]: shared test helpers

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_sign_loss)]

pub mod channel;
pub mod combinator;
pub mod error;
pub mod io;
pub mod observability;
pub mod promise;
pub mod rpc;
pub mod runtime;
pub mod test_utils;
pub mod time;
pub mod types;
pub mod worker;

// Re-exports for convenient access to core types
pub use combinator::{all, any, AggregateError};
pub use error::{Error, ErrorCategory, ErrorKind};
pub use promise::{Promise, Resolver, Step};
pub use runtime::{Scheduler, SchedulerConfig};
pub use types::{PromiseId, RequestId, Settlement};
