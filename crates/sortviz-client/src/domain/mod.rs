//! Domain types for the sortviz client.
//!
//! Plain data with no I/O: the runtime configuration, the connection status
//! reported to listeners, and the error taxonomy every other layer returns.

pub mod config;
pub mod error;
pub mod status;

pub use config::{BenchmarkConfig, ClientConfig, DatasetPolicy, DispatchConfig, ReconnectPolicy, TeachingConfig};
pub use error::ClientError;
pub use status::ConnectionStatus;
