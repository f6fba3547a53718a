//! Core types for the vow settlement primitives.
//!
//! This module contains the fundamental types used throughout the crate:
//!
//! - [`id`]: Identifier types (`PromiseId`, `RequestId`)
//! - [`settlement`]: Two-valued settled outcome type

pub mod id;
pub mod settlement;

pub use id::{PromiseId, RequestId};
pub use settlement::Settlement;
