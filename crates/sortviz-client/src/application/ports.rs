//! Ports: the traits the application layer depends on.
//!
//! The infrastructure layer provides the production implementations
//! (tokio-tungstenite transport, tracing-backed sinks); tests substitute
//! recording mocks.
//!
//! # Why are transport outcomes events, not return values?
//!
//! Opening a WebSocket, receiving a frame and noticing a dropped connection
//! all happen asynchronously.  The [`Transport`] therefore only *starts*
//! work; the outcome arrives later as a [`TransportEvent`] posted into the
//! client's event loop.  Each event carries the [`Generation`] of the session
//! that produced it so the client can ignore events from a transport it has
//! already replaced.

use std::collections::BTreeMap;

use sortviz_core::{Algorithm, DataValue, HighlightClass, PerformanceResult, RequestId};
use thiserror::Error;

use crate::domain::{ClientError, ConnectionStatus};

/// Identifies one transport session.  Incremented on every (re)connect.
pub type Generation = u64;

/// Errors a transport reports synchronously.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The URL cannot be turned into a WebSocket request.
    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// `send` was called without an open session.
    #[error("transport is not open")]
    NotOpen,

    /// The I/O task rejected the frame.
    #[error("transport failure: {0}")]
    Io(String),
}

/// Asynchronous outcomes of transport operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// The session finished its handshake.
    Opened { generation: Generation },
    /// One text frame arrived.
    Frame { generation: Generation, text: String },
    /// The session failed to open, or closed after opening.
    Closed { generation: Generation, reason: String },
}

/// A duplex text-frame connection.
pub trait Transport: Send {
    /// Starts opening a session to `url`.
    ///
    /// Any previous session is dropped.  Success is reported later as
    /// [`TransportEvent::Opened`] with the same `generation`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::InvalidUrl`] when the request cannot even be
    /// constructed.
    fn open(&mut self, url: &str, generation: Generation) -> Result<(), TransportError>;

    /// Queues one text frame on the open session.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when there is no open session or the I/O
    /// task has gone away.
    fn send(&mut self, text: String) -> Result<(), TransportError>;

    /// Closes the current session, if any.  Idempotent.
    fn close(&mut self);
}

/// Draws teaching-mode frames.
#[cfg_attr(test, mockall::automock)]
pub trait Renderer: Send + Sync {
    /// Draws `values` with one highlight class per element.
    fn render(&self, values: &[DataValue], classes: &[HighlightClass]);
}

/// Stores benchmark results as they arrive.
#[cfg_attr(test, mockall::automock)]
pub trait ResultRecorder: Send + Sync {
    fn record(&self, algorithm: Algorithm, result: &PerformanceResult);
}

/// Tells the user what happened.
#[cfg_attr(test, mockall::automock)]
pub trait UserNotifier: Send + Sync {
    fn status_changed(&self, status: ConnectionStatus);
    fn error(&self, error: &ClientError);
    fn suite_completed(&self, results: &BTreeMap<Algorithm, PerformanceResult>);
    fn teaching_finished(&self, request_id: &RequestId);
}
