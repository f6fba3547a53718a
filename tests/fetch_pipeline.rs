//! Chaining against the fetch collaborator seam.

use vow::error::Error;
use vow::io::{Fetch, Response};
use vow::promise::{Promise, Step};
use vow::runtime::Scheduler;
use vow::test_utils::init_test_logging;
use vow::time::{timeout, ManualTimer};

use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;

/// Canned fetch service: URL → response, no network anywhere.
struct StaticFetch {
    routes: HashMap<String, Response>,
}

impl StaticFetch {
    fn new(routes: impl IntoIterator<Item = (&'static str, Response)>) -> Self {
        Self {
            routes: routes
                .into_iter()
                .map(|(url, response)| (url.to_string(), response))
                .collect(),
        }
    }
}

impl Fetch for StaticFetch {
    fn request(&self, scheduler: &Scheduler, url: &str) -> Promise<Response, Error> {
        match self.routes.get(url) {
            Some(response) => Promise::fulfilled(scheduler, response.clone()),
            None => Promise::rejected(scheduler, Error::validation(format!("bad url: {url}"))),
        }
    }
}

#[test]
fn sequential_steps_without_nesting_and_one_error_site() {
    init_test_logging();
    let scheduler = Scheduler::new();
    let fetch = StaticFetch::new([(
        "https://example.test/products.json",
        Response::new(200, r#"[{"name": "baked beans"}, {"name": "tea"}]"#),
    )]);

    let json_scheduler = scheduler.clone();
    let first_name = fetch
        .request(&scheduler, "https://example.test/products.json")
        .then(Response::require_ok)
        .then(move |response| Step::Defer(response.into_json(&json_scheduler)))
        .then(|data: Value| Step::Now(data[0]["name"].as_str().unwrap_or("").to_string()))
        .catch_error(|e| Step::Now(format!("could not get products: {e}")));

    scheduler.run_until_idle();
    assert_eq!(
        first_name.settlement().unwrap().into_result().unwrap(),
        "baked beans"
    );
}

#[test]
fn a_non_success_status_funnels_into_the_single_catch() {
    init_test_logging();
    let scheduler = Scheduler::new();
    let fetch = StaticFetch::new([(
        "https://example.test/not-found",
        Response::new(404, ""),
    )]);

    let json_scheduler = scheduler.clone();
    let outcome = fetch
        .request(&scheduler, "https://example.test/not-found")
        .then(Response::require_ok)
        .then(move |response| Step::Defer(response.into_json(&json_scheduler)))
        .catch_error(|e| Step::Now(json!(format!("failed: {e}"))));

    scheduler.run_until_idle();
    let text = outcome.settlement().unwrap().into_result().unwrap();
    assert!(text.as_str().unwrap().contains("404"));
}

#[test]
fn a_request_can_be_raced_against_a_timer() {
    init_test_logging();
    let scheduler = Scheduler::new();
    let timer = ManualTimer::new();

    // A fetch that never answers, bounded by a deadline.
    let (never, _resolver) = Promise::<Response, Error>::with_resolver(&scheduler);
    let bounded = timeout(&never, &timer, Duration::from_secs(5), || {
        Error::validation("request timed out")
    });

    timer.advance(Duration::from_secs(5));
    scheduler.run_until_idle();
    let error = bounded.settlement().unwrap().into_result().unwrap_err();
    assert!(error.to_string().contains("timed out"));
}
