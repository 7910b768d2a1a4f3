//! sortviz-client library crate.
//!
//! A client for a remote sorting service.  It keeps one WebSocket session
//! open, sends sort requests one at a time, and turns the service's replies
//! into benchmark tables and step-by-step teaching frames.  The sorting
//! itself always happens on the service.
//!
//! # Architecture (clean architecture)
//!
//! ```text
//! sortviz-client binary (clap CLI)
//!         ↕
//! [sortviz-client]
//!   ├── domain/           Configuration, ClientError, ConnectionStatus
//!   ├── application/      ConnectionManager, OutboundDispatcher, InboundRouter,
//!   │                     BenchmarkOrchestrator, TeachingRun, SortClient
//!   └── infrastructure/
//!         ├── ws_transport/  WebSocket session task (tokio-tungstenite)
//!         ├── scheduler/     Timer tasks (tokio::time)
//!         ├── event_loop/    The task that owns the client
//!         └── sinks/         Text renderer, result table, tracing notifier
//!         ↕
//! sorting service  (JSON text frames over WebSocket)
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no I/O and no async.
//! - `application` depends on `domain` and `sortviz-core` only.  It never
//!   blocks or spawns; every delay is a timer that comes back as an event.
//! - `infrastructure` depends on all other layers plus `tokio` and
//!   `tokio-tungstenite`.

/// Domain layer: configuration and error types (no I/O).
pub mod domain;

/// Application layer: session, queue, routing and the two workflows.
pub mod application;

/// Infrastructure layer: WebSocket transport, timers, event loop and sinks.
pub mod infrastructure;
