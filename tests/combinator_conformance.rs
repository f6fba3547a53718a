//! Conformance for the `all` and `any` combinators.

use vow::combinator::{all, any, AggregateError};
use vow::error::{Error, ErrorKind};
use vow::promise::Promise;
use vow::runtime::Scheduler;
use vow::test_utils::init_test_logging;
use vow::types::Settlement;

#[test]
fn all_preserves_input_order_whatever_the_completion_order() {
    init_test_logging();
    let scheduler = Scheduler::new();
    let (p1, r1) = Promise::<i32, &str>::with_resolver(&scheduler);
    let (p2, r2) = Promise::<i32, &str>::with_resolver(&scheduler);
    let (p3, r3) = Promise::<i32, &str>::with_resolver(&scheduler);

    let combined = all(&scheduler, [p1, p2, p3]);

    // Completion order 2, 3, 1.
    r2.fulfill(2);
    r3.fulfill(3);
    r1.fulfill(1);

    scheduler.run_until_idle();
    assert_eq!(
        combined.settlement(),
        Some(Settlement::Fulfilled(vec![1, 2, 3]))
    );
}

#[test]
fn all_rejects_with_boom_without_waiting_for_an_unsettled_input() {
    init_test_logging();
    let scheduler = Scheduler::new();
    let (p1, _r1) = Promise::<i32, &str>::with_resolver(&scheduler);
    let (p2, r2) = Promise::<i32, &str>::with_resolver(&scheduler);

    let combined = all(&scheduler, [p1, p2]);
    r2.reject("boom");

    scheduler.run_until_idle();
    // p1 never settles; the rejection came through anyway.
    assert_eq!(combined.settlement(), Some(Settlement::Rejected("boom")));
}

#[test]
fn any_fulfills_with_a_late_success_after_an_early_rejection() {
    init_test_logging();
    let scheduler = Scheduler::new();
    let (p1, r1) = Promise::<&str, &str>::with_resolver(&scheduler);
    let (p2, r2) = Promise::<&str, &str>::with_resolver(&scheduler);

    let first = any(&scheduler, [p1, p2]);
    r1.reject("first failed");
    scheduler.run_until_idle();
    assert!(first.is_pending());

    r2.fulfill("x");
    scheduler.run_until_idle();
    assert_eq!(first.settlement(), Some(Settlement::Fulfilled("x")));
}

#[test]
fn any_aggregates_every_rejection_in_input_order() {
    init_test_logging();
    let scheduler = Scheduler::new();
    let (p1, r1) = Promise::<i32, &str>::with_resolver(&scheduler);
    let (p2, r2) = Promise::<i32, &str>::with_resolver(&scheduler);

    let first = any(&scheduler, [p1, p2]);
    // Rejections arrive out of input order.
    r2.reject("b");
    r1.reject("a");

    scheduler.run_until_idle();
    assert_eq!(
        first.settlement(),
        Some(Settlement::Rejected(AggregateError::new(vec!["a", "b"])))
    );
}

#[test]
fn empty_inputs_settle_immediately() {
    init_test_logging();
    let scheduler = Scheduler::new();

    let none_needed = all(&scheduler, Vec::<Promise<i32, &str>>::new());
    let none_possible = any(&scheduler, Vec::<Promise<i32, &str>>::new());

    scheduler.run_until_idle();
    assert_eq!(none_needed.settlement(), Some(Settlement::Fulfilled(vec![])));
    match none_possible.settlement().unwrap() {
        Settlement::Rejected(aggregate) => assert!(aggregate.is_empty()),
        Settlement::Fulfilled(_) => panic!("any([]) must reject"),
    }
}

#[test]
fn aggregate_converts_into_the_central_error_type() {
    init_test_logging();
    let scheduler = Scheduler::new();
    let p1 = Promise::<i32, Error>::rejected(&scheduler, Error::remote(500, "a"));
    let p2 = Promise::<i32, Error>::rejected(&scheduler, Error::disconnected());

    let first = any(&scheduler, [p1, p2]);
    scheduler.run_until_idle();

    let aggregate = match first.settlement().unwrap() {
        Settlement::Rejected(aggregate) => aggregate,
        Settlement::Fulfilled(_) => panic!("both inputs rejected"),
    };
    let central: Error = aggregate.into();
    assert_eq!(central.kind(), ErrorKind::AllRejected);
    assert_eq!(central.related().len(), 2);
    assert_eq!(central.related()[0].status(), Some(500));
}

#[test]
fn combinators_observe_inputs_exactly_once_despite_double_settles() {
    init_test_logging();
    let scheduler = Scheduler::new();
    let (p1, r1) = Promise::<i32, &str>::with_resolver(&scheduler);
    let (p2, r2) = Promise::<i32, &str>::with_resolver(&scheduler);

    let combined = all(&scheduler, [p1, p2]);
    // A producer misbehaving: double settles are swallowed upstream.
    r1.fulfill(1);
    r1.fulfill(100);
    r2.fulfill(2);
    r2.reject("late");

    scheduler.run_until_idle();
    assert_eq!(combined.settlement(), Some(Settlement::Fulfilled(vec![1, 2])));
}
