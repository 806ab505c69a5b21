//! Frame struct with typed accessors.
//!
//! Represents one complete frame taken off the stream: its kind and its
//! payload, without the binary header or the text terminator.
//!
//! # Example
//!
//! ```
//! use frame_demux::protocol::{Frame, FrameKind};
//! use bytes::Bytes;
//!
//! let frame = Frame::new(FrameKind::Text, Bytes::from_static(b"hello"));
//!
//! assert!(frame.is_text());
//! assert_eq!(frame.payload(), b"hello");
//! ```

use bytes::Bytes;
use serde::Serialize;

use super::wire_format::{
    encode_binary_header, find_terminator, BINARY_HEADER_SIZE, BINARY_MARKER, TEXT_TERMINATOR,
};
use crate::error::{DemuxError, Result};

/// Kind of a frame, decided by the first byte of the frame on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameKind {
    /// Length-prefixed frame opened by the marker byte.
    Binary,
    /// Frame ended by `\r\n\r\n`.
    Text,
}

/// A complete frame.
///
/// The payload is owned by the frame; the accumulator keeps no handle to it
/// once the frame has been handed to a sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Frame kind.
    pub kind: FrameKind,
    /// Payload bytes.
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame from kind and payload.
    pub fn new(kind: FrameKind, payload: Bytes) -> Self {
        Self { kind, payload }
    }

    /// Create a binary frame, copying the payload.
    pub fn binary(payload: &[u8]) -> Self {
        Self::new(FrameKind::Binary, Bytes::copy_from_slice(payload))
    }

    /// Create a text frame, copying the payload.
    pub fn text(payload: &[u8]) -> Self {
        Self::new(FrameKind::Text, Bytes::copy_from_slice(payload))
    }

    /// Get the frame kind.
    #[inline]
    pub fn kind(&self) -> FrameKind {
        self.kind
    }

    /// Check if this is a binary frame.
    #[inline]
    pub fn is_binary(&self) -> bool {
        self.kind == FrameKind::Binary
    }

    /// Check if this is a text frame.
    #[inline]
    pub fn is_text(&self) -> bool {
        self.kind == FrameKind::Text
    }

    /// Get a reference to the payload bytes.
    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Get the payload length.
    #[inline]
    pub fn payload_len(&self) -> usize {
        self.payload.len()
    }

    /// Payload as UTF-8, replacing invalid sequences.
    pub fn text_lossy(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.payload)
    }

    /// Encode this frame back into its wire representation.
    pub fn encode(&self) -> Result<Vec<u8>> {
        match self.kind {
            FrameKind::Binary => build_binary_frame(&self.payload),
            FrameKind::Text => build_text_frame(&self.payload),
        }
    }
}

/// Build a complete binary frame as a single byte vector.
///
/// # Errors
///
/// Returns `PayloadTooLong` if the payload does not fit the u32 length field.
///
/// # Example
///
/// ```
/// use frame_demux::protocol::build_binary_frame;
///
/// let bytes = build_binary_frame(b"xy").unwrap();
/// assert_eq!(bytes, b"$\x02\x00\x00\x00xy");
/// ```
pub fn build_binary_frame(payload: &[u8]) -> Result<Vec<u8>> {
    let len = binary_length_field(payload.len())?;
    let mut buf = Vec::with_capacity(BINARY_HEADER_SIZE + payload.len());
    buf.extend_from_slice(&encode_binary_header(len));
    buf.extend_from_slice(payload);
    Ok(buf)
}

/// Convert a payload length into the value of the binary length field.
fn binary_length_field(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| DemuxError::PayloadTooLong { len })
}

/// Build a complete text frame as a single byte vector.
///
/// # Errors
///
/// Returns `InvalidTextPayload` if the payload starts with the marker byte,
/// contains the terminator, or ends with `\r\n` (which would complete a
/// terminator two bytes early). Each of these would be parsed differently.
///
/// # Example
///
/// ```
/// use frame_demux::protocol::build_text_frame;
///
/// let bytes = build_text_frame(b"hi").unwrap();
/// assert_eq!(bytes, b"hi\r\n\r\n");
/// ```
pub fn build_text_frame(payload: &[u8]) -> Result<Vec<u8>> {
    if payload.first() == Some(&BINARY_MARKER) {
        return Err(DemuxError::InvalidTextPayload(
            "payload starts with the binary marker".to_string(),
        ));
    }
    if find_terminator(payload, 0).is_some() {
        return Err(DemuxError::InvalidTextPayload(
            "payload contains the terminator".to_string(),
        ));
    }
    if payload.ends_with(&TEXT_TERMINATOR[..2]) {
        return Err(DemuxError::InvalidTextPayload(
            "payload ends with \\r\\n".to_string(),
        ));
    }
    let mut buf = Vec::with_capacity(payload.len() + TEXT_TERMINATOR.len());
    buf.extend_from_slice(payload);
    buf.extend_from_slice(TEXT_TERMINATOR);
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_creation() {
        let frame = Frame::new(FrameKind::Binary, Bytes::from_static(b"abcde"));

        assert!(frame.is_binary());
        assert!(!frame.is_text());
        assert_eq!(frame.kind(), FrameKind::Binary);
        assert_eq!(frame.payload(), b"abcde");
        assert_eq!(frame.payload_len(), 5);
    }

    #[test]
    fn test_frame_empty_payload() {
        let frame = Frame::text(b"");
        assert!(frame.is_text());
        assert!(frame.payload().is_empty());
    }

    #[test]
    fn test_text_lossy() {
        let frame = Frame::text(b"caf\xc3\xa9 \xff");
        assert_eq!(frame.text_lossy(), "café \u{fffd}");
    }

    #[test]
    fn test_build_binary_frame() {
        let bytes = build_binary_frame(b"abcde").unwrap();
        assert_eq!(bytes.len(), BINARY_HEADER_SIZE + 5);
        assert_eq!(&bytes[..BINARY_HEADER_SIZE], &[0x24, 5, 0, 0, 0]);
        assert_eq!(&bytes[BINARY_HEADER_SIZE..], b"abcde");
    }

    #[test]
    fn test_build_binary_frame_empty() {
        let bytes = build_binary_frame(b"").unwrap();
        assert_eq!(bytes, [0x24, 0, 0, 0, 0]);
    }

    #[test]
    fn test_build_binary_frame_may_contain_terminator() {
        let bytes = build_binary_frame(b"\r\n\r\n").unwrap();
        assert_eq!(bytes.len(), BINARY_HEADER_SIZE + 4);
    }

    #[test]
    fn test_build_text_frame() {
        assert_eq!(build_text_frame(b"hello").unwrap(), b"hello\r\n\r\n");
        assert_eq!(build_text_frame(b"").unwrap(), b"\r\n\r\n");
        assert_eq!(build_text_frame(b"a\r\nb").unwrap(), b"a\r\nb\r\n\r\n");
    }

    #[test]
    fn test_build_text_frame_rejects_marker() {
        let err = build_text_frame(b"$5").unwrap_err();
        assert!(err.to_string().contains("binary marker"));
    }

    #[test]
    fn test_build_text_frame_rejects_terminator() {
        let err = build_text_frame(b"a\r\n\r\nb").unwrap_err();
        assert!(err.to_string().contains("terminator"));
    }

    #[test]
    fn test_build_text_frame_rejects_trailing_crlf() {
        for payload in [&b"x\r\n"[..], b"\n\r\n", b"\r\n"] {
            let err = build_text_frame(payload).unwrap_err();
            assert!(err.to_string().contains("ends with"), "{:?}", payload);
        }
    }

    #[test]
    fn test_build_text_frame_accepts_crlf_runs_short_of_terminator() {
        // None of these complete a terminator before the appended one.
        for payload in [&b"x\r"[..], b"a\r\n\rb", b"\r\n\r", b"\n", b"a\r\nb"] {
            let bytes = build_text_frame(payload).unwrap();
            assert_eq!(find_terminator(&bytes, 0), Some(payload.len()), "{:?}", payload);
        }
    }

    #[test]
    fn test_text_frame_with_trailing_crlf_cannot_be_encoded() {
        assert!(Frame::text(b"x\r\n").encode().is_err());
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn test_binary_length_field_overflow() {
        assert_eq!(binary_length_field(u32::MAX as usize).unwrap(), u32::MAX);

        let too_long = u32::MAX as usize + 1;
        let err = binary_length_field(too_long).unwrap_err();
        assert!(matches!(err, DemuxError::PayloadTooLong { len } if len == too_long));
        assert!(err.to_string().contains("does not fit"));
    }

    #[test]
    fn test_encode_dispatches_on_kind() {
        assert_eq!(Frame::text(b"hi").encode().unwrap(), b"hi\r\n\r\n");
        assert_eq!(
            Frame::binary(b"xy").encode().unwrap(),
            b"$\x02\x00\x00\x00xy"
        );
    }

    #[test]
    fn test_kind_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&FrameKind::Binary).unwrap(), "\"binary\"");
        assert_eq!(serde_json::to_string(&FrameKind::Text).unwrap(), "\"text\"");
    }
}
