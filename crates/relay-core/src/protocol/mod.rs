//! Relay wire protocol: logical channels, message schemas, and the JSON
//! text-frame codec.

pub mod channel;
pub mod codec;
pub mod messages;

pub use codec::{decode_frame, encode_frame, EncodeError, ProtocolDecodeError};
