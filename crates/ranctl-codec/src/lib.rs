//! Wire codec for control messages (C1).
//!
//! Each message on the wire is `uint32_be length || payload`, where
//! `payload` is a [`ControlMessage`] serialized as JSON. `encode` never
//! fails on a well-formed [`ControlMessage`] (the type is always
//! serializable); `decode` classifies the three outcomes the distilled
//! spec names: a complete message, an incomplete buffer, or a malformed
//! frame. Malformed frames are the caller's cue to close the connection
//! (see `ranctl-net`).

use ranctl_types::ControlMessage;

/// Length of the frame-length prefix, in bytes.
pub const LENGTH_PREFIX_BYTES: usize = 4;

/// Failure to encode a control message. In practice this only occurs if
/// the encoded payload would overflow a `u32` length field.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    /// Serialization to the wire format failed.
    #[error("failed to serialize control message: {0}")]
    Serialize(#[from] serde_json::Error),
    /// The serialized payload is too large for a `u32` length prefix.
    #[error("payload of {0} bytes exceeds the maximum frame size")]
    TooLarge(usize),
}

/// Result of attempting to decode one frame from a byte buffer.
#[derive(Debug, PartialEq)]
pub enum DecodeOutcome {
    /// A complete message was decoded. `consumed` is the number of bytes
    /// (prefix + payload) the caller should drop from the front of its
    /// receive buffer.
    Message { message: ControlMessage, consumed: usize },
    /// The buffer does not yet contain a complete frame; wait for more
    /// bytes before retrying.
    NeedMore,
    /// The buffer contains a length-prefixed frame whose payload failed
    /// to parse. The connection that produced this frame must be closed
    /// (`ProtocolViolation`, per the error-handling design).
    Malformed(String),
}

/// Serialize a control message into its on-wire frame.
///
/// # Errors
///
/// Returns [`EncodeError`] if serialization fails or the payload would
/// not fit in a `u32`-prefixed frame.
pub fn encode(msg: &ControlMessage) -> Result<Vec<u8>, EncodeError> {
    let payload = serde_json::to_vec(msg)?;
    let len = u32::try_from(payload.len()).map_err(|_| EncodeError::TooLarge(payload.len()))?;
    let mut frame = Vec::with_capacity(LENGTH_PREFIX_BYTES + payload.len());
    frame.extend_from_slice(&len.to_be_bytes());
    frame.extend_from_slice(&payload);
    Ok(frame)
}

/// Attempt to decode one frame from the front of `buf`.
///
/// Does not mutate `buf`; the caller drains `consumed` bytes itself once
/// ready (this lets a reader accumulate partial reads without copying on
/// every poll).
pub fn decode(buf: &[u8]) -> DecodeOutcome {
    if buf.len() < LENGTH_PREFIX_BYTES {
        return DecodeOutcome::NeedMore;
    }
    let Some(len_bytes) = buf.get(0..LENGTH_PREFIX_BYTES) else {
        return DecodeOutcome::NeedMore;
    };
    let Ok(len_bytes): Result<[u8; LENGTH_PREFIX_BYTES], _> = len_bytes.try_into() else {
        return DecodeOutcome::NeedMore;
    };
    let payload_len = u32::from_be_bytes(len_bytes) as usize;
    let total_len = LENGTH_PREFIX_BYTES + payload_len;
    if buf.len() < total_len {
        return DecodeOutcome::NeedMore;
    }
    let Some(payload) = buf.get(LENGTH_PREFIX_BYTES..total_len) else {
        return DecodeOutcome::NeedMore;
    };
    match serde_json::from_slice::<ControlMessage>(payload) {
        Ok(message) => DecodeOutcome::Message { message, consumed: total_len },
        Err(e) => DecodeOutcome::Malformed(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_encode_decode() {
        let msg = ControlMessage::EchoRequest { token: 42 };
        let frame = encode(&msg).unwrap_or_default();
        match decode(&frame) {
            DecodeOutcome::Message { message, consumed } => {
                assert_eq!(message, msg);
                assert_eq!(consumed, frame.len());
            }
            other => assert!(false, "expected a complete message, got {other:?}"),
        }
    }

    #[test]
    fn decode_needs_more_on_short_prefix() {
        assert_eq!(decode(&[0, 0]), DecodeOutcome::NeedMore);
    }

    #[test]
    fn decode_needs_more_on_partial_payload() {
        let msg = ControlMessage::HelloRequest;
        let frame = encode(&msg).unwrap_or_default();
        let partial = frame.get(..frame.len().saturating_sub(1)).unwrap_or(&[]);
        assert_eq!(decode(partial), DecodeOutcome::NeedMore);
    }

    #[test]
    fn decode_malformed_payload_does_not_panic() {
        let mut frame = Vec::new();
        frame.extend_from_slice(&3u32.to_be_bytes());
        frame.extend_from_slice(b"\xff\xfe\xfd");
        match decode(&frame) {
            DecodeOutcome::Malformed(_) => {}
            other => assert!(false, "expected Malformed, got {other:?}"),
        }
    }

    #[test]
    fn decode_leaves_trailing_bytes_for_next_frame() {
        let first = encode(&ControlMessage::HelloRequest).unwrap_or_default();
        let second = encode(&ControlMessage::EchoRequest { token: 7 }).unwrap_or_default();
        let mut both = first.clone();
        both.extend_from_slice(&second);
        match decode(&both) {
            DecodeOutcome::Message { consumed, .. } => assert_eq!(consumed, first.len()),
            other => assert!(false, "expected a complete message, got {other:?}"),
        }
    }
}
