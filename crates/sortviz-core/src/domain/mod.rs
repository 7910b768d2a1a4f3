//! Domain rules for the sortviz client.
//!
//! This module contains pure logic with no infrastructure dependencies: no
//! sockets, no async runtime, no terminal output.  Everything here can be
//! compiled and tested on any platform without a running sorting service.
//!
//! # What lives here? (for beginners)
//!
//! The remote service does the sorting.  What the client still has to decide
//! on its own is small but easy to get wrong:
//!
//! - Which colour class an element gets when a step highlights it in several
//!   ways at once ([`highlight`]).
//! - How a test dataset of a given size and shape is produced ([`dataset`]).
//! - How the user's comparator choices are described to the service
//!   ([`comparator`]).
//!
//! Code in outer layers (the session state machine, the WebSocket transport,
//! the CLI) depends on these rules, but the rules never depend on them.

pub mod comparator;
pub mod dataset;
pub mod highlight;
