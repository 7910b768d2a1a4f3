//! JSON codec for the sorting protocol.
//!
//! Every WebSocket text frame carries exactly one JSON object.  Decoding is
//! done in two stages so the caller gets a precise error:
//!
//! 1. Parse the frame as a generic JSON value and read the `"type"` string.
//! 2. Map the discriminator to a [`MessageKind`] and decode the typed body.
//!
//! A frame whose `type` is unknown is reported as
//! [`ProtocolError::UnknownKind`] rather than as a generic parse failure, so
//! the router can log it as "unknown message" and move on.

use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::Value;
use thiserror::Error;

use crate::protocol::messages::{InboundMessage, OutboundMessage};

/// Errors that can occur while encoding or decoding a text frame.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProtocolError {
    /// The frame is not valid JSON.
    #[error("frame is not valid JSON: {0}")]
    MalformedJson(String),

    /// The frame is valid JSON but not an object.
    #[error("frame is not a JSON object")]
    NotAnObject,

    /// The object has no string `"type"` field.
    #[error("frame has no string \"type\" field")]
    MissingDiscriminator,

    /// The `"type"` field names a message this client does not understand.
    #[error("unknown message type: {0}")]
    UnknownKind(String),

    /// The discriminator is known but the body does not match its schema.
    #[error("invalid {kind} payload: {reason}")]
    InvalidPayload { kind: MessageKind, reason: String },

    /// An outbound envelope could not be serialized.
    #[error("failed to encode outbound message: {0}")]
    Encode(String),
}

/// Discriminator of an inbound envelope.
///
/// This is the key of the router's handler table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    StepUpdate,
    PerformanceResult,
    Error,
}

impl MessageKind {
    /// Maps a wire discriminator to a kind.  Matching is exact.
    pub fn from_wire(value: &str) -> Option<Self> {
        match value {
            "STEP_UPDATE" => Some(MessageKind::StepUpdate),
            "PERFORMANCE_RESULT" => Some(MessageKind::PerformanceResult),
            "ERROR" => Some(MessageKind::Error),
            _ => None,
        }
    }

    /// The discriminator as it appears on the wire.
    pub fn as_wire(self) -> &'static str {
        match self {
            MessageKind::StepUpdate => "STEP_UPDATE",
            MessageKind::PerformanceResult => "PERFORMANCE_RESULT",
            MessageKind::Error => "ERROR",
        }
    }
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_wire())
    }
}

impl InboundMessage {
    /// The kind of this envelope.
    pub fn kind(&self) -> MessageKind {
        match self {
            InboundMessage::StepUpdate(_) => MessageKind::StepUpdate,
            InboundMessage::PerformanceResult(_) => MessageKind::PerformanceResult,
            InboundMessage::Error(_) => MessageKind::Error,
        }
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Serializes an outbound envelope to a JSON text frame.
///
/// # Errors
///
/// Returns [`ProtocolError::Encode`] if serialization fails.
///
/// # Examples
///
/// ```rust
/// use sortviz_core::protocol::{encode_outbound, ControlAction, ControlRequest, OutboundMessage, RequestId};
///
/// let msg = OutboundMessage::Control(ControlRequest {
///     request_id: RequestId::from("r1"),
///     action: ControlAction::Stop,
///     timestamp: None,
/// });
/// let text = encode_outbound(&msg).unwrap();
/// assert_eq!(text, r#"{"type":"CONTROL","requestId":"r1","action":"STOP"}"#);
/// ```
pub fn encode_outbound(msg: &OutboundMessage) -> Result<String, ProtocolError> {
    serde_json::to_string(msg).map_err(|e| ProtocolError::Encode(e.to_string()))
}

/// Decodes one inbound text frame.
///
/// # Errors
///
/// Returns [`ProtocolError`] describing the first stage that failed.
///
/// # Examples
///
/// ```rust
/// use sortviz_core::protocol::{decode_inbound, InboundMessage, MessageKind};
///
/// let msg = decode_inbound(r#"{"type":"ERROR","message":"bad input"}"#).unwrap();
/// assert_eq!(msg.kind(), MessageKind::Error);
/// ```
pub fn decode_inbound(frame: &str) -> Result<InboundMessage, ProtocolError> {
    let value: Value =
        serde_json::from_str(frame).map_err(|e| ProtocolError::MalformedJson(e.to_string()))?;

    let kind = {
        let object = value.as_object().ok_or(ProtocolError::NotAnObject)?;
        let tag = object
            .get("type")
            .and_then(Value::as_str)
            .ok_or(ProtocolError::MissingDiscriminator)?;
        MessageKind::from_wire(tag).ok_or_else(|| ProtocolError::UnknownKind(tag.to_string()))?
    };

    serde_json::from_value(value).map_err(|e| ProtocolError::InvalidPayload {
        kind,
        reason: e.to_string(),
    })
}

/// Milliseconds since the Unix epoch, for the optional `timestamp` fields.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

// ── Tests ─────────────────────────────────────────────────────────────────────
