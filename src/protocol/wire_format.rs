//! Wire format constants, header encoding and terminator search.
//!
//! Two frame kinds share one byte stream:
//! ```text
//! binary:  ┌────────┬──────────────┬──────────────┐
//!          │ 0x24   │ Length       │ Payload      │
//!          │ 1 byte │ uint32 LE    │ Length bytes │
//!          └────────┴──────────────┴──────────────┘
//!
//! text:    ┌──────────────┬─────────────┐
//!          │ Payload      │ \r\n\r\n    │
//!          │ any bytes    │ 4 bytes     │
//!          └──────────────┴─────────────┘
//! ```
//!
//! The kind of a fresh frame is decided by its first byte alone.
//! The length field is Little Endian on every host.

use bytes::Buf;

use super::FrameKind;

/// Marker byte that opens a binary frame (`$`).
pub const BINARY_MARKER: u8 = 0x24;

/// Binary header size in bytes: marker + u32 length.
pub const BINARY_HEADER_SIZE: usize = 5;

/// Sequence that ends a text frame.
pub const TEXT_TERMINATOR: &[u8; 4] = b"\r\n\r\n";

/// Default upper bound on a single frame payload (16 MiB).
pub const DEFAULT_MAX_FRAME_SIZE: usize = 16 * 1024 * 1024;

/// Default initial capacity of the pending buffer (64 KiB).
pub const DEFAULT_INITIAL_CAPACITY: usize = 64 * 1024;

impl FrameKind {
    /// Decide the kind of a fresh frame from its first byte.
    #[inline]
    pub fn detect(first_byte: u8) -> Self {
        if first_byte == BINARY_MARKER {
            FrameKind::Binary
        } else {
            FrameKind::Text
        }
    }
}

/// Encode a binary header for a payload of `len` bytes.
pub fn encode_binary_header(len: u32) -> [u8; BINARY_HEADER_SIZE] {
    let mut buf = [0u8; BINARY_HEADER_SIZE];
    buf[0] = BINARY_MARKER;
    buf[1..].copy_from_slice(&len.to_le_bytes());
    buf
}

/// Decode the declared payload length from a binary header.
///
/// Returns `None` if fewer than [`BINARY_HEADER_SIZE`] bytes are given.
/// The marker byte itself is not checked.
pub fn decode_binary_length(header: &[u8]) -> Option<u32> {
    if header.len() < BINARY_HEADER_SIZE {
        return None;
    }
    let mut len_bytes = &header[1..BINARY_HEADER_SIZE];
    Some(len_bytes.get_u32_le())
}

/// Find the earliest terminator in `buf`, starting the scan at `from`.
///
/// `from` lets a caller resume a scan without re-reading bytes it has
/// already checked. Returns the offset of the first terminator byte.
pub fn find_terminator(buf: &[u8], from: usize) -> Option<usize> {
    if from >= buf.len() {
        return None;
    }
    buf[from..]
        .windows(TEXT_TERMINATOR.len())
        .position(|w| w == TEXT_TERMINATOR)
        .map(|pos| pos + from)
}

/// Offset from which a rescan must restart after `scanned_len` bytes
/// were searched without a match.
///
/// The last `TEXT_TERMINATOR.len() - 1` bytes may be a terminator prefix.
#[inline]
pub fn resume_offset(scanned_len: usize) -> usize {
    scanned_len.saturating_sub(TEXT_TERMINATOR.len() - 1)
}
