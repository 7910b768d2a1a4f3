//! Application layer of the sorting-service client.
//!
//! # Components
//!
//! - **`connection`** – `ConnectionManager`: the single transport session,
//!   status listeners and reconnection with bounded linear backoff.
//!
//! - **`dispatcher`** – `OutboundDispatcher`: FIFO outbound queue.  At most
//!   one message is transmitted per send cooldown.
//!
//! - **`router`** – `InboundRouter`: decodes inbound frames and hands each one
//!   to the handler registered for its kind.
//!
//! - **`benchmark`** – `BenchmarkOrchestrator`: runs a list of algorithms
//!   against the service one after another and collects their results.
//!
//! - **`teaching`** – `TeachingRun`: consumes the step stream of a
//!   teaching-mode request and renders each frame.
//!
//! - **`client`** – `SortClient`: wires the components together and reacts
//!   to one `ClientEvent` at a time.
//!
//! - **`timers`** and **`ports`** – the seams to the infrastructure layer.
//!
//! Nothing in this layer blocks or spawns.  Delays are armed through
//! [`timers::Timers`] and come back as events.

pub mod benchmark;
pub mod client;
pub mod connection;
pub mod dispatcher;
pub mod ports;
pub mod router;
pub mod teaching;
pub mod timers;

pub use client::{ClientCommand, ClientCore, ClientEvent, Collaborators, SortClient};
