//! # sortviz-core
//!
//! Shared library for the sortviz client containing the JSON wire protocol,
//! highlight classification rules, comparator descriptions and dataset
//! generation.
//!
//! The sorting itself happens on a remote service.  The client sends a
//! `SORT_REQUEST` envelope over a WebSocket and receives a stream of typed
//! envelopes back (`STEP_UPDATE` frames while teaching, one
//! `PERFORMANCE_RESULT` per benchmarked algorithm, or an `ERROR`).
//!
//! This crate has zero dependencies on sockets, async runtimes or UI code.
//!
//! - **`protocol`** – The envelope types exchanged with the service and the
//!   codec that turns them into (and back from) UTF-8 JSON text frames.
//!
//! - **`domain`** – Pure rules: which colour class wins when an index is
//!   highlighted several ways at once, how datasets of a given shape are
//!   generated, and how comparator settings are described to the server.

pub mod domain;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `sortviz_core::InboundMessage` instead of the full module path.
pub use domain::comparator::{ComparatorSettings, ComparisonMethod, PersonField, SortDirection};
pub use domain::dataset::{DatasetGenerator, DatasetParams, RandomDatasetGenerator};
pub use domain::highlight::{classify, HighlightClass};
pub use protocol::codec::{decode_inbound, encode_outbound, now_millis, MessageKind, ProtocolError};
pub use protocol::messages::{
    Algorithm, ComparatorInfo, ControlAction, ControlRequest, DataType, DataValue, Distribution,
    ErrorReport, HighlightSets, InboundMessage, OutboundMessage, PerformanceResult, Person,
    SortMode, SortRequest, StepStats, StepUpdate,
};
pub use protocol::request_id::RequestId;
