//! Connection status of the single session.

use std::fmt;

/// Lifecycle state of the connection to the sorting service.
///
/// ```text
///             connect()            opened
/// Disconnected ───────► Connecting ──────► Connected
///      ▲                    │                  │
///      └────────────────────┴──────────────────┘
///           closed / failed / close()
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConnectionStatus::Disconnected => "disconnected",
            ConnectionStatus::Connecting => "connecting",
            ConnectionStatus::Connected => "connected",
        })
    }
}
