//! Port endpoints and the frame codec.

use std::sync::mpsc::{self, RecvTimeoutError, TryRecvError};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A tagged message payload.
///
/// The tag routes the message at the receiving end; the payload is
/// structured data. Everything that crosses a port is an envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Routing tag, e.g. `"request"`.
    pub tag: String,
    /// Structured payload.
    pub payload: serde_json::Value,
}

impl Envelope {
    /// Creates an envelope from a tag and payload.
    #[must_use]
    pub fn new(tag: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            tag: tag.into(),
            payload,
        }
    }
}

/// An inbound delivery on a port.
#[derive(Debug)]
pub enum PortEvent {
    /// A decoded message from the other end.
    Message(Envelope),
    /// A frame arrived but could not be decoded. The channel stays open.
    Malformed(Error),
    /// The other end is gone. Delivered exactly once; the port is closed
    /// afterwards.
    Closed,
}

/// Frame-level decode failure, converted into [`PortEvent::Malformed`].
#[derive(Debug, thiserror::Error)]
enum FrameError {
    #[error("frame is not a valid envelope: {reason}")]
    Decode {
        /// Underlying serde failure.
        reason: String,
    },
}

fn decode(bytes: &[u8]) -> Result<Envelope, FrameError> {
    serde_json::from_slice(bytes).map_err(|err| FrameError::Decode {
        reason: err.to_string(),
    })
}

/// The posting half of a port, cheap to clone.
///
/// Handlers running inside [`Port::pump`] hold the port mutably, so
/// anything that needs to answer from within a handler posts through a
/// sender obtained up front with [`Port::sender`].
#[derive(Debug, Clone)]
pub struct PortSender {
    tx: mpsc::Sender<Vec<u8>>,
}

impl PortSender {
    /// Serializes and enqueues an envelope for the other end.
    ///
    /// Delivery is asynchronous and unacknowledged. The only synchronous
    /// failure is a locally detectable disconnect.
    pub fn post(&self, envelope: Envelope) -> Result<(), Error> {
        let bytes = serde_json::to_vec(&envelope)
            .map_err(|err| Error::internal(format!("envelope encode failed: {err}")))?;
        self.tx.send(bytes).map_err(|_| Error::disconnected())
    }

    /// Enqueues raw bytes without encoding. Test hook for exercising the
    /// malformed-frame path.
    #[doc(hidden)]
    pub fn post_raw(&self, bytes: Vec<u8>) -> Result<(), Error> {
        self.tx.send(bytes).map_err(|_| Error::disconnected())
    }
}

/// One end of a channel between two isolated contexts.
///
/// A port is owned and pumped by exactly one context. Posting is
/// non-blocking; delivery happens when the owning context calls
/// [`pump`](Self::pump) or [`pump_blocking`](Self::pump_blocking), which
/// hand each inbound event to the single registered handler in delivery
/// order.
pub struct Port {
    sender: PortSender,
    rx: mpsc::Receiver<Vec<u8>>,
    handler: Option<Box<dyn FnMut(PortEvent) + Send>>,
    open: bool,
}

/// Creates a connected pair of ports.
#[must_use]
pub fn pair() -> (Port, Port) {
    let (tx_a, rx_b) = mpsc::channel();
    let (tx_b, rx_a) = mpsc::channel();
    (
        Port {
            sender: PortSender { tx: tx_a },
            rx: rx_a,
            handler: None,
            open: true,
        },
        Port {
            sender: PortSender { tx: tx_b },
            rx: rx_b,
            handler: None,
            open: true,
        },
    )
}

impl Port {
    /// Serializes and enqueues an envelope for the other end.
    ///
    /// See [`PortSender::post`].
    pub fn post(&self, envelope: Envelope) -> Result<(), Error> {
        self.sender.post(envelope)
    }

    /// Returns a cloneable posting handle for this end.
    #[must_use]
    pub fn sender(&self) -> PortSender {
        self.sender.clone()
    }

    /// Registers the inbound handler for this end, replacing any previous
    /// one. Nothing is delivered until a handler is registered.
    pub fn on_event(&mut self, handler: impl FnMut(PortEvent) + Send + 'static) {
        self.handler = Some(Box::new(handler));
    }

    /// Returns false once `Closed` has been delivered.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open
    }

    /// Delivers every currently queued inbound event to the handler, in
    /// order. Returns the number of events delivered.
    ///
    /// Without a registered handler this is a no-op: frames stay queued
    /// so none are lost before registration.
    pub fn pump(&mut self) -> usize {
        if self.handler.is_none() || !self.open {
            return 0;
        }
        let mut delivered = 0;
        loop {
            match self.rx.try_recv() {
                Ok(frame) => {
                    self.deliver_frame(&frame);
                    delivered += 1;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.deliver_closed();
                    delivered += 1;
                    break;
                }
            }
        }
        delivered
    }

    /// Like [`pump`](Self::pump), but waits up to `timeout` for the first
    /// event before draining the rest.
    pub fn pump_blocking(&mut self, timeout: Duration) -> usize {
        if self.handler.is_none() || !self.open {
            return 0;
        }
        match self.rx.recv_timeout(timeout) {
            Ok(frame) => {
                self.deliver_frame(&frame);
                1 + self.pump()
            }
            Err(RecvTimeoutError::Timeout) => 0,
            Err(RecvTimeoutError::Disconnected) => {
                self.deliver_closed();
                1
            }
        }
    }

    fn deliver_frame(&mut self, frame: &[u8]) {
        let event = match decode(frame) {
            Ok(envelope) => PortEvent::Message(envelope),
            Err(err) => PortEvent::Malformed(Error::malformed_frame(err.to_string())),
        };
        if let Some(handler) = self.handler.as_mut() {
            handler(event);
        }
    }

    fn deliver_closed(&mut self) {
        self.open = false;
        if let Some(handler) = self.handler.as_mut() {
            handler(PortEvent::Closed);
        }
    }
}

impl std::fmt::Debug for Port {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Port")
            .field("open", &self.open)
            .field("handler", &self.handler.is_some())
            .finish()
    }
}
