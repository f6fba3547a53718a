//! Error types and error handling strategy.
//!
//! This module defines the central error type used by the promise and
//! channel layers. Error handling follows these principles:
//!
//! - Errors are explicit and typed (no stringly-typed errors)
//! - Synchronous input validation rejects the promise, it never panics
//!   past the caller
//! - Combinators never suppress errors: `all` surfaces the first rejection
//!   verbatim, `any` surfaces every rejection in input order
//!
//! # Error Categories
//!
//! - **Validation**: invalid synchronous input (e.g. a negative delay)
//! - **Remote**: a non-success outcome reported by the far side of a
//!   channel, carrying a status code
//! - **Transport**: channel-level failure (remote termination, malformed
//!   frame)
//! - **Aggregate**: every input of an `any` combinator rejected
//! - **Internal**: invariant violations (bugs)

use core::fmt;

use crate::combinator::AggregateError;

/// The kind of error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    // === Validation ===
    /// Synchronous input was invalid; rejected before any deferred work.
    InvalidInput,

    // === Remote ===
    /// The far side reported a non-success outcome.
    Remote,
    /// The far side did not recognize the requested command.
    UnknownCommand,

    // === Transport ===
    /// The channel to the far side is gone (remote terminated or the peer
    /// port was dropped).
    Disconnected,
    /// A frame arrived that could not be decoded.
    MalformedFrame,

    // === Aggregate ===
    /// Every input of an `any` combinator rejected.
    AllRejected,

    // === Internal ===
    /// Internal invariant violation (bug).
    Internal,
}

/// Broad category of an error kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Invalid synchronous input.
    Validation,
    /// Reported by the far side of a channel.
    Remote,
    /// Channel-level failure.
    Transport,
    /// Aggregated rejections.
    Aggregate,
    /// Runtime bug.
    Internal,
}

impl ErrorKind {
    /// Returns the error category for this kind.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidInput => ErrorCategory::Validation,
            Self::Remote | Self::UnknownCommand => ErrorCategory::Remote,
            Self::Disconnected | Self::MalformedFrame => ErrorCategory::Transport,
            Self::AllRejected => ErrorCategory::Aggregate,
            Self::Internal => ErrorCategory::Internal,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::InvalidInput => "invalid input",
            Self::Remote => "remote error",
            Self::UnknownCommand => "unknown command",
            Self::Disconnected => "channel disconnected",
            Self::MalformedFrame => "malformed frame",
            Self::AllRejected => "all inputs rejected",
            Self::Internal => "internal error",
        };
        f.write_str(name)
    }
}

/// The main error type for vow operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    kind: ErrorKind,
    message: Option<String>,
    status: Option<u16>,
    related: Vec<Error>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub const fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            status: None,
            related: Vec::new(),
        }
    }

    /// Creates a validation error with a description of the invalid input.
    #[must_use]
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidInput).with_message(msg)
    }

    /// Creates a remote error carrying the far side's status code.
    #[must_use]
    pub fn remote(status: u16, msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Remote)
            .with_message(msg)
            .with_status(status)
    }

    /// Creates a transport error for a lost channel.
    #[must_use]
    pub fn disconnected() -> Self {
        Self::new(ErrorKind::Disconnected)
    }

    /// Creates a transport error for an undecodable frame.
    #[must_use]
    pub fn malformed_frame(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::MalformedFrame).with_message(msg)
    }

    /// Creates an internal error (invariant violation).
    #[must_use]
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal).with_message(msg)
    }

    /// Returns the error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the broad category of this error.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        self.kind.category()
    }

    /// Returns true if this is a channel-level failure.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self.category(), ErrorCategory::Transport)
    }

    /// Returns true if this error was reported by the far side.
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        matches!(self.category(), ErrorCategory::Remote)
    }

    /// Returns the status code reported by the far side, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        self.status
    }

    /// Returns the message, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Returns the aggregated per-input errors, in input order.
    ///
    /// Empty unless this error has kind [`ErrorKind::AllRejected`].
    #[must_use]
    pub fn related(&self) -> &[Error] {
        &self.related
    }

    /// Adds a message description to the error.
    #[must_use]
    pub fn with_message(mut self, msg: impl Into<String>) -> Self {
        self.message = Some(msg.into());
        self
    }

    /// Adds a status code to the error.
    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(status) = self.status {
            write!(f, " (status {status})")?;
        }
        if let Some(msg) = &self.message {
            write!(f, ": {msg}")?;
        }
        if !self.related.is_empty() {
            write!(f, " [{} errors]", self.related.len())?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {}

impl From<AggregateError<Error>> for Error {
    fn from(aggregate: AggregateError<Error>) -> Self {
        Self {
            kind: ErrorKind::AllRejected,
            message: None,
            status: None,
            related: aggregate.into_errors(),
        }
    }
}
