//! Two-valued settled outcome type.
//!
//! A settlement is the final state of a promise:
//!
//! - `Fulfilled(T)`: the deferred operation succeeded with a value
//! - `Rejected(E)`: the deferred operation failed with an error
//!
//! Unlike `Result`, a settlement is never an intermediate value that flows
//! through `?`; it is the stored, immutable outcome delivered to every
//! reaction attached to a promise. Pending is not representable here: a
//! promise that has not settled has no settlement yet.

use core::fmt;

/// The settled outcome of a deferred operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement<T, E> {
    /// The operation succeeded with a value.
    Fulfilled(T),
    /// The operation failed with an error.
    Rejected(E),
}

impl<T, E> Settlement<T, E> {
    /// Returns true if this settlement is `Fulfilled`.
    #[must_use]
    pub const fn is_fulfilled(&self) -> bool {
        matches!(self, Self::Fulfilled(_))
    }

    /// Returns true if this settlement is `Rejected`.
    #[must_use]
    pub const fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }

    /// Returns the fulfillment value, if any.
    #[must_use]
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Fulfilled(v) => Some(v),
            Self::Rejected(_) => None,
        }
    }

    /// Returns the rejection error, if any.
    #[must_use]
    pub fn error(&self) -> Option<&E> {
        match self {
            Self::Fulfilled(_) => None,
            Self::Rejected(e) => Some(e),
        }
    }

    /// Maps the fulfillment value using the provided function.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Settlement<U, E> {
        match self {
            Self::Fulfilled(v) => Settlement::Fulfilled(f(v)),
            Self::Rejected(e) => Settlement::Rejected(e),
        }
    }

    /// Maps the rejection error using the provided function.
    pub fn map_err<F2, F: FnOnce(E) -> F2>(self, f: F) -> Settlement<T, F2> {
        match self {
            Self::Fulfilled(v) => Settlement::Fulfilled(v),
            Self::Rejected(e) => Settlement::Rejected(f(e)),
        }
    }

    /// Converts this settlement to a standard `Result`.
    pub fn into_result(self) -> Result<T, E> {
        match self {
            Self::Fulfilled(v) => Ok(v),
            Self::Rejected(e) => Err(e),
        }
    }

    /// Borrowing conversion to `Result`.
    pub fn as_result(&self) -> Result<&T, &E> {
        match self {
            Self::Fulfilled(v) => Ok(v),
            Self::Rejected(e) => Err(e),
        }
    }
}

impl<T, E> From<Result<T, E>> for Settlement<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(v) => Self::Fulfilled(v),
            Err(e) => Self::Rejected(e),
        }
    }
}

impl<T: fmt::Display, E: fmt::Display> fmt::Display for Settlement<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fulfilled(v) => write!(f, "fulfilled: {v}"),
            Self::Rejected(e) => write!(f, "rejected: {e}"),
        }
    }
}
