//! Unique identifiers for outbound requests.
//!
//! Every envelope the client sends carries a `requestId`.  The service echoes
//! it back on the `STEP_UPDATE`, `PERFORMANCE_RESULT` and `ERROR` envelopes
//! that belong to that request, which lets the client tell a late answer to
//! an abandoned request apart from the answer it is waiting for.
//!
//! Ids are random UUID v4 values rendered in the canonical hyphenated form,
//! the same shape the browser client produced.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of one outbound request.
///
/// # Examples
///
/// ```rust
/// use sortviz_core::protocol::RequestId;
///
/// let a = RequestId::new();
/// let b = RequestId::new();
/// assert_ne!(a, b);
/// assert_eq!(a.to_string().len(), 36);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    /// Generates a fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the id as it appears on the wire.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RequestId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
