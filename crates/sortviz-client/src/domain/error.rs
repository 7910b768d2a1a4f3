//! Error taxonomy of the client.
//!
//! No variant terminates the process.  Each one is either recovered
//! automatically (reconnection, benchmark step retry) or surfaced to the user
//! through the notifier so they can reconnect or start again.

use sortviz_core::{ProtocolError, RequestId};
use thiserror::Error;

/// Errors produced by the client core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClientError {
    /// The transport could not be opened or closed unexpectedly.
    ///
    /// `fatal` is set once the reconnect attempts are exhausted; no further
    /// retries happen until the user connects again.
    #[error("cannot reach {url}: {reason}")]
    Connectivity {
        url: String,
        reason: String,
        fatal: bool,
    },

    /// An inbound frame was malformed or of an unknown kind.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The service answered with an `ERROR` envelope.
    #[error("service error{}: {message}", code_suffix(.code))]
    Application {
        message: String,
        code: Option<String>,
    },

    /// A message could not be handed to the transport.  It was dropped.
    #[error("failed to send request {request_id}: {reason}")]
    SendFailure { request_id: RequestId, reason: String },

    /// A user command was rejected before anything was sent.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

fn code_suffix(code: &Option<String>) -> String {
    code.as_deref().map(|c| format!(" [{c}]")).unwrap_or_default()
}

impl ClientError {
    /// Returns `true` when the session will not recover on its own.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ClientError::Connectivity { fatal: true, .. })
    }
}
