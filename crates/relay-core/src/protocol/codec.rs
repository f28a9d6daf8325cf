//! Text-frame codec for relay messages.
//!
//! Wire format: one JSON object per WebSocket text frame, no length prefix, no
//! envelope.  Binary frames are not part of the protocol.

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// An inbound frame could not be turned into the expected message.
///
/// Receivers log this and drop the frame; it never stops a receive loop.
#[derive(Debug, Error)]
pub enum ProtocolDecodeError {
    /// The text was not valid JSON, or did not match the expected schema.
    #[error("malformed {expected} frame: {source}")]
    Malformed {
        expected: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// A binary frame arrived on a text-only channel.
    #[error("unexpected binary frame ({0} bytes)")]
    UnexpectedBinary(usize),
}

/// An outbound message could not be serialized.
#[derive(Debug, Error)]
#[error("failed to encode frame: {0}")]
pub struct EncodeError(#[from] serde_json::Error);

// ── Public API ────────────────────────────────────────────────────────────────

/// Encodes a message as the text of one frame.
///
/// # Errors
///
/// Returns [`EncodeError`] if serialization fails (e.g. a non-string map key).
///
/// # Examples
///
/// ```rust
/// use relay_core::protocol::codec::encode_frame;
/// use relay_core::protocol::messages::PositionSet;
///
/// let text = encode_frame(&PositionSet::default()).unwrap();
/// assert_eq!(text, r#"{"pos":[]}"#);
/// ```
pub fn encode_frame<T: Serialize>(msg: &T) -> Result<String, EncodeError> {
    Ok(serde_json::to_string(msg)?)
}

/// Decodes the text of one frame.
///
/// # Errors
///
/// Returns [`ProtocolDecodeError::Malformed`] if the text is not a `T`.
pub fn decode_frame<T: DeserializeOwned>(text: &str) -> Result<T, ProtocolDecodeError> {
    serde_json::from_str(text).map_err(|source| ProtocolDecodeError::Malformed {
        expected: short_type_name::<T>(),
        source,
    })
}

/// `relay_core::protocol::messages::PositionSet` -> `PositionSet`.
fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}
