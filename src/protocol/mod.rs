//! Protocol module - wire format, framing, and frame types.
//!
//! This module implements the framing of one mixed byte stream:
//! - Binary frames: `0x24` marker + u32 LE length + payload
//! - Text frames: payload terminated by `\r\n\r\n`
//! - Frame accumulator for reassembling frames from partial reads

mod accumulator;
mod frame;
mod wire_format;

pub use accumulator::{FrameAccumulator, ParserState};
pub use frame::{build_binary_frame, build_text_frame, Frame, FrameKind};
pub use wire_format::{
    decode_binary_length, encode_binary_header, find_terminator, BINARY_HEADER_SIZE,
    BINARY_MARKER, DEFAULT_INITIAL_CAPACITY, DEFAULT_MAX_FRAME_SIZE, TEXT_TERMINATOR,
};
