//! Envelope types for the JSON-over-WebSocket sorting protocol.
//!
//! # Message flow
//!
//! ```text
//! Client → Service:  OutboundMessage  →  JSON text frame
//! Service → Client:  JSON text frame  →  InboundMessage
//! ```
//!
//! # JSON discriminant
//!
//! Every envelope is a JSON object with a `"type"` field that identifies the
//! variant.  All other fields are flattened into the same object and use
//! camelCase names, for example:
//!
//! ```json
//! {"type":"PERFORMANCE_RESULT","algorithm":"QUICK","time":12,"comparisons":9120,"swaps":2410}
//! ```
//!
//! Serde's `#[serde(tag = "type")]` attribute handles this automatically.
//!
//! # Null tolerance
//!
//! The service serializes absent collections as explicit `null` rather than
//! omitting them.  Fields that have a natural empty value (`highlight`,
//! `stats`, index lists) therefore accept `null` and decode it as empty.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::comparator::{ComparisonMethod, PersonField, SortDirection};
use crate::protocol::request_id::RequestId;

// ── Shared enums ──────────────────────────────────────────────────────────────

/// How the service should execute a sort request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortMode {
    /// Stream every intermediate step as a `STEP_UPDATE` envelope.
    Teaching,
    /// Sort at full speed and answer with a single `PERFORMANCE_RESULT`.
    Performance,
}

/// The algorithms the service knows how to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Algorithm {
    Insertion,
    Shell,
    Bubble,
    Quick,
    Heap,
    Merge,
}

impl Algorithm {
    /// Every algorithm, in the order a full benchmark suite runs them.
    pub const ALL: [Algorithm; 6] = [
        Algorithm::Insertion,
        Algorithm::Shell,
        Algorithm::Bubble,
        Algorithm::Quick,
        Algorithm::Heap,
        Algorithm::Merge,
    ];

    /// The upper-case name used on the wire (e.g. `"QUICK"`).
    pub fn wire_name(self) -> &'static str {
        match self {
            Algorithm::Insertion => "INSERTION",
            Algorithm::Shell => "SHELL",
            Algorithm::Bubble => "BUBBLE",
            Algorithm::Quick => "QUICK",
            Algorithm::Heap => "HEAP",
            Algorithm::Merge => "MERGE",
        }
    }

    /// Returns `true` if `name` (as echoed by the service) names this algorithm.
    ///
    /// The comparison ignores ASCII case because the service echoes whatever
    /// spelling the request used.
    pub fn matches(self, name: &str) -> bool {
        self.wire_name().eq_ignore_ascii_case(name.trim())
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.wire_name().to_ascii_lowercase())
    }
}

impl FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Algorithm::ALL
            .into_iter()
            .find(|a| a.matches(s))
            .ok_or_else(|| format!("unknown algorithm: {s}"))
    }
}

/// Element type of a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataType {
    Integer,
    Double,
    Person,
}

impl FromStr for DataType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "int" | "integer" => Ok(DataType::Integer),
            "double" | "float" => Ok(DataType::Double),
            "person" => Ok(DataType::Person),
            other => Err(format!("unknown data type: {other}")),
        }
    }
}

/// Shape of a generated dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Distribution {
    /// Uniformly random values in `[min, max)`.
    Random,
    /// An ascending ramp with roughly 10 % of the elements perturbed.
    Sorted,
    /// The `Sorted` ramp, reversed.
    Reverse,
    /// Values drawn from a small pool, so most of them repeat.
    Duplicate,
    /// Normally distributed around the middle of the range, clamped to it.
    Normal,
    /// User-supplied data of unknown shape.
    Custom,
}

impl FromStr for Distribution {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "random" => Ok(Distribution::Random),
            "sorted" => Ok(Distribution::Sorted),
            "reverse" => Ok(Distribution::Reverse),
            "duplicate" => Ok(Distribution::Duplicate),
            "normal" => Ok(Distribution::Normal),
            "custom" => Ok(Distribution::Custom),
            other => Err(format!("unknown distribution: {other}")),
        }
    }
}

// ── Dataset elements ──────────────────────────────────────────────────────────

/// A structured record, the service's `Person` data type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: u32,
    pub name: String,
    pub age: u32,
    pub score: f64,
    #[serde(default)]
    pub email: String,
}

/// One element of a dataset: a plain number or a `Person` record.
///
/// `#[serde(untagged)]` tries the variants in order, so integral JSON numbers
/// stay integers (`5`, not `5.0`) when they are echoed back to the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DataValue {
    Int(i64),
    Float(f64),
    Record(Person),
}

impl DataValue {
    /// Numeric magnitude of this element, as used for bar heights.
    ///
    /// Records are measured by `field`; string fields map to ten times their
    /// length, which keeps names visually distinguishable.
    pub fn magnitude(&self, field: PersonField) -> f64 {
        match self {
            DataValue::Int(v) => *v as f64,
            DataValue::Float(v) => *v,
            DataValue::Record(p) => match field {
                PersonField::Score => p.score,
                PersonField::Age => f64::from(p.age),
                PersonField::Id => f64::from(p.id),
                PersonField::Name => (p.name.chars().count() * 10) as f64,
            },
        }
    }
}

// ── Client → Service envelopes ────────────────────────────────────────────────

/// Comparator description attached to a sort request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparatorInfo {
    pub direction: SortDirection,
    pub method: ComparisonMethod,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub struct_field: Option<PersonField>,
}

/// Body of a `SORT_REQUEST` envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortRequest {
    pub request_id: RequestId,
    pub mode: SortMode,
    pub algorithm: Algorithm,
    pub data: Vec<DataValue>,
    /// Delay between streamed steps in milliseconds (teaching mode only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<u32>,
    pub data_type: DataType,
    pub distribution: Distribution,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ascending: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comparator_info: Option<ComparatorInfo>,
    /// Milliseconds since the Unix epoch at the time the request was built.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
}

/// Flow-control action for a teaching run that is streaming steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ControlAction {
    Pause,
    Resume,
    Stop,
}

/// Body of a `CONTROL` envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlRequest {
    /// Id of the sort request this action applies to.
    pub request_id: RequestId,
    pub action: ControlAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
}

/// All envelopes the client sends to the service.
///
/// # Serde representation
///
/// ```json
/// {"type":"SORT_REQUEST","requestId":"…","mode":"PERFORMANCE","algorithm":"HEAP","data":[3,1,2],"dataType":"INTEGER","distribution":"RANDOM"}
/// {"type":"CONTROL","requestId":"…","action":"PAUSE"}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutboundMessage {
    SortRequest(SortRequest),
    Control(ControlRequest),
}

impl OutboundMessage {
    /// The id carried by this envelope.
    pub fn request_id(&self) -> &RequestId {
        match self {
            OutboundMessage::SortRequest(r) => &r.request_id,
            OutboundMessage::Control(c) => &c.request_id,
        }
    }

    /// The wire discriminator, for log messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            OutboundMessage::SortRequest(_) => "SORT_REQUEST",
            OutboundMessage::Control(_) => "CONTROL",
        }
    }
}

// ── Service → Client envelopes ────────────────────────────────────────────────

/// Index sets of one step, keyed by highlight classification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighlightSets {
    #[serde(default, deserialize_with = "null_as_default")]
    pub compare: Vec<usize>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub swap: Vec<usize>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub heap: Vec<usize>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pivot: Vec<usize>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sorted: Vec<usize>,
}

/// Running counters reported with each step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepStats {
    #[serde(default, deserialize_with = "null_as_default")]
    pub comparisons: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub swaps: u64,
    /// Elapsed milliseconds.
    #[serde(default, deserialize_with = "null_as_default")]
    pub time: u64,
}

/// Body of a `STEP_UPDATE` envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepUpdate {
    #[serde(default, deserialize_with = "null_as_default")]
    pub step: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_steps: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<DataValue>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub highlight: HighlightSets,
    #[serde(default, deserialize_with = "null_as_default")]
    pub stats: StepStats,
    #[serde(default)]
    pub request_id: Option<RequestId>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_final: bool,
}

/// Body of a `PERFORMANCE_RESULT` envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceResult {
    /// Algorithm name as echoed by the service (usually upper-case).
    pub algorithm: String,
    /// Wall-clock sort time in milliseconds.
    pub time: u64,
    pub comparisons: u64,
    pub swaps: u64,
    #[serde(default)]
    pub request_id: Option<RequestId>,
    #[serde(default)]
    pub data_size: Option<usize>,
    #[serde(default)]
    pub distribution: Option<String>,
    #[serde(default)]
    pub sorted: Option<bool>,
}

/// Body of an `ERROR` envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    pub message: String,
    /// Machine-readable code such as `VALIDATION_ERROR` or `ALGORITHM_ERROR`.
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub request_id: Option<RequestId>,
}

/// All envelopes the client understands from the service.
///
/// # Serde representation
///
/// ```json
/// {"type":"STEP_UPDATE","step":3,"totalSteps":40,"data":[1,5,2],"highlight":{"swap":[1,2]}}
/// {"type":"PERFORMANCE_RESULT","algorithm":"MERGE","time":4,"comparisons":8700,"swaps":0}
/// {"type":"ERROR","message":"unsupported algorithm"}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InboundMessage {
    StepUpdate(StepUpdate),
    PerformanceResult(PerformanceResult),
    Error(ErrorReport),
}

impl InboundMessage {
    /// The request id echoed by the service, if any.
    pub fn request_id(&self) -> Option<&RequestId> {
        match self {
            InboundMessage::StepUpdate(m) => m.request_id.as_ref(),
            InboundMessage::PerformanceResult(m) => m.request_id.as_ref(),
            InboundMessage::Error(m) => m.request_id.as_ref(),
        }
    }
}

/// Deserializes `null` as `T::default()`.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_request() -> SortRequest {
        SortRequest {
            request_id: RequestId::from("req-1"),
            mode: SortMode::Performance,
            algorithm: Algorithm::Quick,
            data: vec![DataValue::Int(3), DataValue::Int(1), DataValue::Int(2)],
            interval: None,
            data_type: DataType::Integer,
            distribution: Distribution::Random,
            ascending: None,
            comparator_info: None,
            timestamp: None,
        }
    }

    // ── OutboundMessage serialization ─────────────────────────────────────────

    #[test]
    fn test_sort_request_serializes_with_type_discriminant() {
        // Arrange
        let msg = OutboundMessage::SortRequest(sample_request());

        // Act
        let json = serde_json::to_string(&msg).unwrap();

        // Assert: the `"type"` field is the screaming-case variant name
        assert!(json.contains(r#""type":"SORT_REQUEST""#));
        assert!(json.contains(r#""requestId":"req-1""#));
        assert!(json.contains(r#""algorithm":"QUICK""#));
        assert!(json.contains(r#""dataType":"INTEGER""#));
        assert!(json.contains(r#""data":[3,1,2]"#), "integers must not gain a decimal point: {json}");
    }

    #[test]
    fn test_sort_request_omits_absent_optional_fields() {
        let json = serde_json::to_string(&OutboundMessage::SortRequest(sample_request())).unwrap();
        assert!(!json.contains("interval"));
        assert!(!json.contains("ascending"));
        assert!(!json.contains("comparatorInfo"));
    }

    #[test]
    fn test_control_request_serializes_action() {
        let msg = OutboundMessage::Control(ControlRequest {
            request_id: RequestId::from("req-9"),
            action: ControlAction::Pause,
            timestamp: None,
        });
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains(r#""type":"CONTROL""#));
        assert!(json.contains(r#""action":"PAUSE""#));
        assert_eq!(msg.request_id().as_str(), "req-9");
        assert_eq!(msg.kind_name(), "CONTROL");
    }

    #[test]
    fn test_person_data_serializes_as_objects() {
        let mut req = sample_request();
        req.data_type = DataType::Person;
        req.data = vec![DataValue::Record(Person {
            id: 1,
            name: "Ada".to_string(),
            age: 36,
            score: 99.0,
            email: "ada@example.com".to_string(),
        })];
        let json = serde_json::to_string(&OutboundMessage::SortRequest(req)).unwrap();
        assert!(json.contains(r#""name":"Ada""#));
        assert!(json.contains(r#""dataType":"PERSON""#));
    }

    // ── InboundMessage deserialization ────────────────────────────────────────

    #[test]
    fn test_step_update_deserializes_from_service_json() {
        // Arrange: shape produced by the service, including explicit nulls
        let json = r#"{
            "type": "STEP_UPDATE",
            "requestId": "req-1",
            "step": 2,
            "totalSteps": 10,
            "data": [5, 1.5, 3],
            "highlight": {"compare": [0, 1], "swap": null, "heap": null, "pivot": null, "sorted": [2]},
            "stats": {"comparisons": 4, "swaps": 1, "time": 12},
            "description": "compare 5 and 1.5",
            "isFinal": false,
            "timestamp": 1700000000000
        }"#;

        // Act
        let msg: InboundMessage = serde_json::from_str(json).unwrap();

        // Assert
        match msg {
            InboundMessage::StepUpdate(s) => {
                assert_eq!(s.step, 2);
                assert_eq!(s.total_steps, 10);
                assert_eq!(s.data, vec![DataValue::Int(5), DataValue::Float(1.5), DataValue::Int(3)]);
                assert_eq!(s.highlight.compare, vec![0, 1]);
                assert!(s.highlight.swap.is_empty());
                assert_eq!(s.highlight.sorted, vec![2]);
                assert_eq!(s.stats.comparisons, 4);
                assert_eq!(s.request_id, Some(RequestId::from("req-1")));
            }
            other => panic!("expected StepUpdate, got {other:?}"),
        }
    }

    #[test]
    fn test_step_update_with_null_highlight_and_stats_decodes_as_empty() {
        let json = r#"{"type":"STEP_UPDATE","step":1,"totalSteps":1,"data":[1],"highlight":null,"stats":null}"#;
        let msg: InboundMessage = serde_json::from_str(json).unwrap();
        match msg {
            InboundMessage::StepUpdate(s) => {
                assert_eq!(s.highlight, HighlightSets::default());
                assert_eq!(s.stats, StepStats::default());
            }
            other => panic!("expected StepUpdate, got {other:?}"),
        }
    }

    #[test]
    fn test_performance_result_ignores_unknown_fields() {
        let json = r#"{
            "type": "PERFORMANCE_RESULT",
            "requestId": "abc",
            "algorithm": "MERGE",
            "time": 7,
            "comparisons": 8704,
            "swaps": 0,
            "dataSize": 1000,
            "distribution": "RANDOM",
            "sortedData": [1, 2, 3],
            "sorted": true
        }"#;
        let msg: InboundMessage = serde_json::from_str(json).unwrap();
        match msg {
            InboundMessage::PerformanceResult(r) => {
                assert_eq!(r.algorithm, "MERGE");
                assert_eq!(r.time, 7);
                assert_eq!(r.comparisons, 8704);
                assert_eq!(r.data_size, Some(1000));
            }
            other => panic!("expected PerformanceResult, got {other:?}"),
        }
    }

    #[test]
    fn test_error_report_carries_code() {
        let json = r#"{"type":"ERROR","message":"boom","code":"ALGORITHM_ERROR","requestId":"r"}"#;
        let msg: InboundMessage = serde_json::from_str(json).unwrap();
        assert_eq!(msg.request_id(), Some(&RequestId::from("r")));
        match msg {
            InboundMessage::Error(e) => {
                assert_eq!(e.message, "boom");
                assert_eq!(e.code.as_deref(), Some("ALGORITHM_ERROR"));
            }
            other => panic!("expected Error, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_message_type_returns_error() {
        let json = r#"{"type":"SORT_COMPLETE","message":"done"}"#;
        let result: Result<InboundMessage, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    // ── Enum helpers ──────────────────────────────────────────────────────────

    #[test]
    fn test_algorithm_matches_is_case_insensitive() {
        assert!(Algorithm::Quick.matches("QUICK"));
        assert!(Algorithm::Quick.matches("quick"));
        assert!(!Algorithm::Quick.matches("HEAP"));
    }

    #[test]
    fn test_algorithm_from_str_accepts_lowercase_names() {
        assert_eq!("shell".parse::<Algorithm>().unwrap(), Algorithm::Shell);
        assert!("bogo".parse::<Algorithm>().is_err());
    }

    #[test]
    fn test_algorithm_all_is_in_suite_order() {
        let names: Vec<String> = Algorithm::ALL.iter().map(ToString::to_string).collect();
        assert_eq!(names, ["insertion", "shell", "bubble", "quick", "heap", "merge"]);
    }

    #[test]
    fn test_data_type_accepts_int_alias() {
        assert_eq!("int".parse::<DataType>().unwrap(), DataType::Integer);
        assert_eq!("Person".parse::<DataType>().unwrap(), DataType::Person);
    }

    #[test]
    fn test_magnitude_uses_selected_person_field() {
        let p = DataValue::Record(Person {
            id: 7,
            name: "Bob".to_string(),
            age: 40,
            score: 55.5,
            email: String::new(),
        });
        assert_eq!(p.magnitude(PersonField::Score), 55.5);
        assert_eq!(p.magnitude(PersonField::Age), 40.0);
        assert_eq!(p.magnitude(PersonField::Id), 7.0);
        assert_eq!(p.magnitude(PersonField::Name), 30.0);
        assert_eq!(DataValue::Int(4).magnitude(PersonField::Score), 4.0);
    }
}
