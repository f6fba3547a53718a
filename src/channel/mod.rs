//! Order-preserving message channel between isolated contexts.
//!
//! Two contexts that share no mutable state interact only through a pair
//! of connected [`Port`]s. A posted [`Envelope`] is serialized to bytes,
//! carried to the other end, and decoded at delivery, so nothing
//! reference-shaped ever crosses the boundary:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        PORT PAIR                                │
//! │                                                                 │
//! │   context A                               context B             │
//! │      │                                        │                 │
//! │      │── post(env) ──► bytes ──► queue ──────►│ pump()          │
//! │      │                                        │  └─► handler    │
//! │      │ pump() ◄────── queue ◄── bytes ◄── post(env) ──│         │
//! │      │                                        │                 │
//! │   (drop) ─────────────────────────────────────► Closed event    │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Delivery is asynchronous, at-most-once, and FIFO per direction: frames
//! posted A-then-B are delivered A-then-B. There is no acknowledgment.
//! A frame that fails to decode surfaces as a `Malformed` event and the
//! peer disappearing surfaces as a single `Closed` event; neither hangs
//! the receiving end.

mod port;

pub use port::{pair, Envelope, Port, PortEvent, PortSender};
