//! Request/response adapter over a port pair.
//!
//! The adapter is the one component that couples the channel layer to
//! promises. The requesting side attaches a [`Client`] to its port: each
//! [`request`](Client::request) allocates a fresh correlation id, parks
//! the promise's resolver in a pending-request table, and posts a
//! `request` envelope. Inbound `response` and `error` envelopes settle
//! and remove the matching entry, whatever order they arrive in. A
//! channel close rejects everything still pending with a transport error
//! and empties the table, so nothing hangs and nothing leaks.
//!
//! The answering side (typically a worker) installs a [`Dispatcher`]:
//! command handlers registered by name, each answering with a `response`
//! or `error` envelope carrying the request's correlation id. Handlers
//! run synchronously in the worker's delivery loop; a long computation
//! holds up that worker, not the requesting side.

pub mod wire;

pub use wire::{CallPayload, WireError};

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::Value;

use crate::channel::{Port, PortEvent, PortSender};
use crate::error::{Error, ErrorKind};
use crate::observability::{LogCollector, LogEntry};
use crate::promise::{Promise, Resolver};
use crate::runtime::Scheduler;
use crate::types::RequestId;

#[derive(Default)]
struct PendingTable {
    entries: HashMap<RequestId, Resolver<Value, Error>>,
    closed: bool,
}

/// The requesting side of the adapter.
///
/// Owns the pending-request table and the port's inbound route. The port
/// itself stays with the caller, who keeps pumping it as part of the
/// context's normal drive loop.
pub struct Client {
    sender: PortSender,
    scheduler: Scheduler,
    pending: Arc<Mutex<PendingTable>>,
}

impl Client {
    /// Attaches a client to a port, taking over its inbound handler.
    #[must_use]
    pub fn attach(port: &mut Port, scheduler: &Scheduler) -> Self {
        let pending = Arc::new(Mutex::new(PendingTable::default()));
        let route_pending = Arc::clone(&pending);
        let collector = Arc::clone(scheduler.collector());
        port.on_event(move |event| route(&route_pending, &collector, event));
        Self {
            sender: port.sender(),
            scheduler: scheduler.clone(),
            pending,
        }
    }

    /// Sends a command to the far side, returning the pending promise of
    /// its result.
    ///
    /// The promise settles when the matching answer arrives: fulfilled by
    /// a `response`, rejected by an `error`, rejected with a transport
    /// error if the channel closes first. A synchronous post failure
    /// rejects it immediately.
    pub fn request(&self, command: impl Into<String>, args: Value) -> Promise<Value, Error> {
        let (promise, resolver) = Promise::with_resolver(&self.scheduler);
        let correlation_id = RequestId::next();

        {
            let mut table = self.pending.lock().expect("pending table poisoned");
            if table.closed {
                drop(table);
                resolver.reject(Error::disconnected());
                return promise;
            }
            table.entries.insert(correlation_id, resolver.clone());
        }

        let posted = CallPayload::Request {
            correlation_id,
            command: command.into(),
            args,
        }
        .into_envelope()
        .and_then(|envelope| self.sender.post(envelope));

        if let Err(error) = posted {
            self.pending
                .lock()
                .expect("pending table poisoned")
                .entries
                .remove(&correlation_id);
            resolver.reject(error);
        }
        promise
    }

    /// Number of requests still awaiting an answer.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending
            .lock()
            .expect("pending table poisoned")
            .entries
            .len()
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("pending", &self.pending_len())
            .finish()
    }
}

/// Routes one inbound event into the pending table.
fn route(pending: &Arc<Mutex<PendingTable>>, collector: &Arc<LogCollector>, event: PortEvent) {
    match event {
        PortEvent::Message(envelope) => match CallPayload::from_envelope(&envelope) {
            Ok(CallPayload::Response {
                correlation_id,
                result,
            }) => match take_entry(pending, correlation_id) {
                Some(resolver) => resolver.fulfill(result),
                None => record_unmatched(collector, correlation_id),
            },
            Ok(CallPayload::Error {
                correlation_id,
                error,
            }) => match take_entry(pending, correlation_id) {
                Some(resolver) => resolver.reject(error.into_error()),
                None => record_unmatched(collector, correlation_id),
            },
            Ok(CallPayload::Request { correlation_id, .. }) => {
                collector.record(
                    LogEntry::warn("request received on requesting side")
                        .with_field("correlation", correlation_id.to_string()),
                );
            }
            Err(error) => {
                collector.record(
                    LogEntry::warn("undecodable call payload")
                        .with_field("tag", envelope.tag)
                        .with_field("error", error.to_string()),
                );
            }
        },
        // A malformed frame carries no usable correlation id; pending
        // requests stay live and may still be answered.
        PortEvent::Malformed(error) => {
            collector.record(
                LogEntry::warn("malformed frame").with_field("error", error.to_string()),
            );
        }
        PortEvent::Closed => {
            let entries = {
                let mut table = pending.lock().expect("pending table poisoned");
                table.closed = true;
                std::mem::take(&mut table.entries)
            };
            if !entries.is_empty() {
                collector.record(
                    LogEntry::info("channel closed with requests in flight")
                        .with_field("rejected", entries.len().to_string()),
                );
            }
            for (_, resolver) in entries {
                resolver.reject(Error::disconnected());
            }
        }
    }
}

fn take_entry(
    pending: &Arc<Mutex<PendingTable>>,
    correlation_id: RequestId,
) -> Option<Resolver<Value, Error>> {
    pending
        .lock()
        .expect("pending table poisoned")
        .entries
        .remove(&correlation_id)
}

fn record_unmatched(collector: &Arc<LogCollector>, correlation_id: RequestId) {
    collector.record(
        LogEntry::warn("answer for unknown correlation id")
            .with_field("correlation", correlation_id.to_string()),
    );
}

type CommandHandler = Box<dyn FnMut(Value) -> Result<Value, Error> + Send>;

/// The answering side of the adapter: named command handlers.
///
/// Handlers run synchronously inside the delivery loop of the context the
/// dispatcher is installed in; long-running work is exactly what workers
/// exist for. Every `request` envelope is answered: by the handler's
/// result, or by an error envelope for unknown commands.
pub struct Dispatcher {
    handlers: HashMap<String, CommandHandler>,
    sender: PortSender,
    collector: Arc<LogCollector>,
}

impl Dispatcher {
    /// Creates a dispatcher answering through `sender`.
    #[must_use]
    pub fn new(sender: PortSender, collector: Arc<LogCollector>) -> Self {
        Self {
            handlers: HashMap::new(),
            sender,
            collector,
        }
    }

    /// Registers the handler for a command name, replacing any previous
    /// one.
    pub fn register(
        &mut self,
        command: impl Into<String>,
        handler: impl FnMut(Value) -> Result<Value, Error> + Send + 'static,
    ) {
        self.handlers.insert(command.into(), Box::new(handler));
    }

    /// Installs the dispatcher as the port's inbound handler.
    pub fn install(mut self, port: &mut Port) {
        port.on_event(move |event| self.handle(event));
    }

    fn handle(&mut self, event: PortEvent) {
        match event {
            PortEvent::Message(envelope) => match CallPayload::from_envelope(&envelope) {
                Ok(CallPayload::Request {
                    correlation_id,
                    command,
                    args,
                }) => self.answer(correlation_id, &command, args),
                Ok(other) => {
                    self.collector.record(
                        LogEntry::warn("non-request payload on answering side")
                            .with_field("correlation", other.correlation_id().to_string()),
                    );
                }
                Err(error) => {
                    self.collector.record(
                        LogEntry::warn("undecodable call payload")
                            .with_field("error", error.to_string()),
                    );
                }
            },
            PortEvent::Malformed(error) => {
                self.collector.record(
                    LogEntry::warn("malformed frame").with_field("error", error.to_string()),
                );
            }
            PortEvent::Closed => {}
        }
    }

    fn answer(&mut self, correlation_id: RequestId, command: &str, args: Value) {
        let reply = match self.handlers.get_mut(command) {
            Some(handler) => match handler(args) {
                Ok(result) => CallPayload::Response {
                    correlation_id,
                    result,
                },
                Err(error) => CallPayload::Error {
                    correlation_id,
                    error: WireError::from_error(&error),
                },
            },
            None => CallPayload::Error {
                correlation_id,
                error: WireError::from_error(
                    &Error::new(ErrorKind::UnknownCommand)
                        .with_message(format!("unknown command: {command}")),
                ),
            },
        };
        let posted = reply
            .into_envelope()
            .and_then(|envelope| self.sender.post(envelope));
        if let Err(error) = posted {
            // The requester is gone; there is nobody left to answer.
            self.collector.record(
                LogEntry::debug("answer dropped, peer gone")
                    .with_field("correlation", correlation_id.to_string())
                    .with_field("error", error.to_string()),
            );
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("commands", &self.handlers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel;
    use serde_json::json;

    /// In-process harness: client on port A, dispatcher on port B, both
    /// pumped by hand for deterministic interleavings.
    fn harness() -> (Scheduler, Client, Port, Port) {
        let scheduler = Scheduler::new();
        let (mut near, mut far) = channel::pair();
        let client = Client::attach(&mut near, &scheduler);

        let worker_collector = Arc::new(LogCollector::new());
        let mut dispatcher = Dispatcher::new(far.sender(), worker_collector);
        dispatcher.register("double", |args| {
            let n = args["n"].as_i64().unwrap_or(0);
            Ok(json!(n * 2))
        });
        dispatcher.register("fail", |_args| Err(Error::remote(500, "handler failed")));
        dispatcher.install(&mut far);

        (scheduler, client, near, far)
    }

    #[test]
    fn request_settles_with_the_handler_result() {
        let (scheduler, client, mut near, mut far) = harness();

        let promise = client.request("double", json!({"n": 21}));
        assert!(promise.is_pending());

        far.pump();
        near.pump();
        scheduler.run_until_idle();

        assert_eq!(
            promise.settlement().unwrap().into_result().unwrap(),
            json!(42)
        );
        assert_eq!(client.pending_len(), 0);
    }

    #[test]
    fn out_of_order_answers_resolve_their_own_requests() {
        let scheduler = Scheduler::new();
        let (mut near, mut far) = channel::pair();
        let client = Client::attach(&mut near, &scheduler);

        let first = client.request("a", json!(null));
        let second = client.request("b", json!(null));
        assert_eq!(client.pending_len(), 2);

        // Capture both requests by hand instead of using a dispatcher.
        let requests = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&requests);
        far.on_event(move |event| {
            if let PortEvent::Message(envelope) = event {
                sink.lock()
                    .unwrap()
                    .push(CallPayload::from_envelope(&envelope).unwrap());
            }
        });
        assert_eq!(far.pump(), 2);
        let ids: Vec<RequestId> = requests
            .lock()
            .unwrap()
            .iter()
            .map(CallPayload::correlation_id)
            .collect();

        // Answer in reverse arrival order.
        for (correlation_id, result) in [(ids[1], json!("second")), (ids[0], json!("first"))] {
            let reply = CallPayload::Response {
                correlation_id,
                result,
            };
            far.post(reply.into_envelope().unwrap()).unwrap();
        }
        near.pump();
        scheduler.run_until_idle();

        assert_eq!(
            first.settlement().unwrap().into_result().unwrap(),
            json!("first")
        );
        assert_eq!(
            second.settlement().unwrap().into_result().unwrap(),
            json!("second")
        );
        assert_eq!(client.pending_len(), 0);
    }

    #[test]
    fn unknown_command_rejects_with_a_remote_error() {
        let (scheduler, client, mut near, mut far) = harness();

        let promise = client.request("nope", json!(null));
        far.pump();
        near.pump();
        scheduler.run_until_idle();

        let error = promise.settlement().unwrap().into_result().unwrap_err();
        assert!(error.is_remote());
        assert!(error.to_string().contains("unknown command"));
    }

    #[test]
    fn handler_error_rejects_with_status() {
        let (scheduler, client, mut near, mut far) = harness();

        let promise = client.request("fail", json!(null));
        far.pump();
        near.pump();
        scheduler.run_until_idle();

        let error = promise.settlement().unwrap().into_result().unwrap_err();
        assert_eq!(error.status(), Some(500));
    }

    #[test]
    fn close_rejects_all_pending_and_empties_the_table() {
        let (scheduler, client, mut near, far) = harness();

        let first = client.request("double", json!({"n": 1}));
        let second = client.request("double", json!({"n": 2}));
        assert_eq!(client.pending_len(), 2);

        drop(far);
        near.pump(); // requests bounce: peer gone → Closed
        scheduler.run_until_idle();

        for promise in [first, second] {
            let error = promise.settlement().unwrap().into_result().unwrap_err();
            assert!(error.is_transport());
        }
        assert_eq!(client.pending_len(), 0);
    }

    #[test]
    fn requests_after_close_reject_immediately() {
        let (scheduler, client, mut near, far) = harness();
        drop(far);
        near.pump();
        scheduler.run_until_idle();

        let promise = client.request("double", json!({"n": 1}));
        scheduler.run_until_idle();
        let error = promise.settlement().unwrap().into_result().unwrap_err();
        assert!(error.is_transport());
    }

    #[test]
    fn malformed_frame_leaves_pending_requests_live() {
        let (scheduler, client, mut near, mut far) = harness();

        let promise = client.request("double", json!({"n": 3}));
        far.sender().post_raw(b"garbage".to_vec()).unwrap();

        near.pump();
        scheduler.run_until_idle();
        assert!(promise.is_pending());
        assert_eq!(client.pending_len(), 1);

        // The real answer still lands afterwards.
        far.pump();
        near.pump();
        scheduler.run_until_idle();
        assert_eq!(
            promise.settlement().unwrap().into_result().unwrap(),
            json!(6)
        );
    }
}
