//! Infrastructure layer of the sorting-service client.
//!
//! Contains the adapters behind the application ports: the tokio-tungstenite
//! WebSocket transport, the tokio timer scheduler, the event loop task, the
//! default text sinks and TOML configuration loading.
//!
//! **Dependency rule**: this layer may depend on `application`, `domain` and
//! `sortviz_core`, but MUST NOT be imported by the `application` or `domain`
//! layers (tests excepted).
//!
//! # Sub-modules
//!
//! - **`ws_transport`** – `WsTransport`: one spawned task per session that
//!   performs the handshake and pumps text frames in both directions.
//!
//! - **`scheduler`** – `TokioScheduler`: one sleeping task per armed timer.
//!
//! - **`event_loop`** – `EventLoop` (the single task that owns the client)
//!   and `ClientHandle` (the cloneable sender used to command it).
//!
//! - **`sinks`** – `TextRenderer`, `SummaryRecorder` and `TracingNotifier`,
//!   used by the command-line binary.
//!
//! - **`config_file`** – `load_config` for the optional TOML file.
//!
//! - **`mock`** – in-memory transport, scheduler and recording sinks for
//!   unit and integration tests.

pub mod config_file;
pub mod event_loop;
pub mod mock;
pub mod scheduler;
pub mod sinks;
pub mod ws_transport;

pub use config_file::{load_config, ConfigError};
pub use event_loop::{ClientHandle, EventLoop, Sinks};
pub use sinks::{SessionOutcome, SummaryRecorder, TextRenderer, TracingNotifier};
