//! Protocol module containing the envelope types and the JSON codec.

pub mod codec;
pub mod messages;
pub mod request_id;

pub use codec::{decode_inbound, encode_outbound, now_millis, MessageKind, ProtocolError};
pub use messages::*;
pub use request_id::RequestId;
