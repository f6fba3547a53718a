//! Combinators reducing a collection of promises to one.
//!
//! This module provides the aggregate combinators:
//!
//! - [`all`](mod@all): fulfill when every input fulfills, reject on the
//!   first rejection
//! - [`any`](mod@any): fulfill with the first fulfillment, reject only
//!   when every input rejected
//!
//! Both take their inputs as an ordered sequence and both take the
//! scheduler explicitly, so the empty-input cases have a home for the
//! derived promise. Neither cancels slower inputs, since there is no
//! cancellation primitive; outcomes that lost simply go unobserved.

pub mod all;
pub mod any;

pub use all::all;
pub use any::{any, AggregateError};
