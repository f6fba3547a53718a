//! External I/O collaborator interfaces.
//!
//! The core performs no I/O. Fetch-style request services and ambient
//! event sources are injected capabilities behind the traits here; the
//! crate only defines the seams and the [`Response`] shape their
//! promises carry. Test doubles implement these traits in a few lines.

use serde_json::Value;

use crate::error::Error;
use crate::promise::{Promise, Step};
use crate::runtime::Scheduler;

/// A fetch-like request service: one URL in, one eventual response out.
pub trait Fetch: Send + Sync {
    /// Starts a request and returns the promise of its response.
    ///
    /// The promise rejects for failures that prevented any response
    /// (transport loss, bad scheme); a server-side failure is a fulfilled
    /// response with a non-success status.
    fn request(&self, scheduler: &Scheduler, url: &str) -> Promise<Response, Error>;
}

/// A response produced by a [`Fetch`] service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: u16,
    body: String,
}

impl Response {
    /// Creates a response from a status code and raw body.
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// The status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// True for success statuses (200–299).
    #[must_use]
    pub const fn ok(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// The raw body.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Parses the body as JSON, deferred.
    ///
    /// Like the body arriving after the headers, the parsed value is a
    /// promise of its own: fulfilled with the parsed value, rejected with
    /// a validation error when the body is not JSON.
    pub fn into_json(self, scheduler: &Scheduler) -> Promise<Value, Error> {
        match serde_json::from_str(&self.body) {
            Ok(value) => Promise::fulfilled(scheduler, value),
            Err(err) => Promise::rejected(
                scheduler,
                Error::validation(format!("response body is not valid JSON: {err}")),
            ),
        }
    }

    /// Chains status checking into a promise pipeline: a success status
    /// passes the response through, anything else becomes a remote error
    /// carrying the status.
    pub fn require_ok(self) -> Step<Response, Error> {
        if self.ok() {
            Step::Now(self)
        } else {
            Step::Fail(Error::remote(self.status, "request failed"))
        }
    }
}

/// An ambient event source: fire-and-forget handler registration.
///
/// Consumed by dispatcher-style code outside the settlement core; the
/// core itself never registers anything.
pub trait EventSource {
    /// Registers a handler for a named event.
    fn on(&self, event: &str, handler: Box<dyn FnMut(Value) + Send>);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ok_is_the_2xx_range() {
        assert!(Response::new(200, "").ok());
        assert!(Response::new(299, "").ok());
        assert!(!Response::new(199, "").ok());
        assert!(!Response::new(404, "").ok());
    }

    #[test]
    fn into_json_parses_deferred() {
        let scheduler = Scheduler::new();
        let response = Response::new(200, r#"[{"name": "baked beans"}]"#);
        let parsed = response.into_json(&scheduler);

        scheduler.run_until_idle();
        assert_eq!(
            parsed.settlement().unwrap().into_result().unwrap()[0]["name"],
            json!("baked beans")
        );
    }

    #[test]
    fn into_json_rejects_non_json() {
        let scheduler = Scheduler::new();
        let parsed = Response::new(200, "not json").into_json(&scheduler);

        scheduler.run_until_idle();
        let error = parsed.settlement().unwrap().into_result().unwrap_err();
        assert_eq!(error.kind(), crate::error::ErrorKind::InvalidInput);
    }

    #[test]
    fn require_ok_fails_non_success_statuses() {
        let scheduler = Scheduler::new();
        let promise = Promise::<Response, Error>::fulfilled(&scheduler, Response::new(404, ""));
        let checked = promise.then(Response::require_ok);

        scheduler.run_until_idle();
        let error = checked.settlement().unwrap().into_result().unwrap_err();
        assert_eq!(error.status(), Some(404));
    }
}
