//! Frame accumulator for reassembling frames from partial reads.
//!
//! Uses `bytes::BytesMut` as the pending buffer.
//! Implements a state machine over a single byte stream carrying two frame kinds:
//! - `Waiting`: No frame in progress, pending buffer is empty
//! - `ReadingText`: Scanning for `\r\n\r\n`
//! - `ReadingBinary`: Waiting for the 5-byte header, then for the declared payload
//!
//! Every `feed` drains all frames that are complete in the buffer before it
//! returns, so a caller never has to feed again to receive frames that have
//! already arrived.
//!
//! # Example
//!
//! ```
//! use frame_demux::{FrameAccumulator, FrameCollector};
//!
//! let mut acc = FrameAccumulator::new(FrameCollector::new());
//!
//! // Data arrives in arbitrary chunks
//! acc.feed(b"hi\r\n").unwrap();
//! acc.feed(b"\r\n$\x02\x00\x00\x00xy").unwrap();
//!
//! let frames = acc.into_sink().take_frames();
//! assert_eq!(frames.len(), 2);
//! assert!(frames[0].is_text());
//! assert_eq!(frames[1].payload(), b"xy");
//! ```

use bytes::{Buf, BytesMut};

use super::wire_format::{
    decode_binary_length, find_terminator, resume_offset, BINARY_HEADER_SIZE, TEXT_TERMINATOR,
};
use super::{Frame, FrameKind};
use crate::config::AccumulatorConfig;
use crate::error::{DemuxError, Result};
use crate::sink::FrameSink;

/// Internal state machine for frame parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// No frame in progress.
    Waiting,
    /// Text frame in progress; `scanned` bytes were already searched.
    ReadingText { scanned: usize },
    /// Binary frame in progress; length is known once the header is complete.
    ReadingBinary { payload_len: Option<u32> },
}

/// Observable parser state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    /// No partial frame is buffered.
    Waiting,
    /// A text frame is partially buffered.
    ReadingText,
    /// A binary frame is partially buffered.
    ReadingBinary,
}

/// Accumulates incoming bytes and hands every completed frame to a sink.
///
/// One accumulator serves one logical stream. Dropping it discards any
/// partial frame.
pub struct FrameAccumulator<S: FrameSink> {
    /// Bytes received but not yet consumed into a frame.
    buffer: BytesMut,
    /// Current parsing state.
    state: State,
    /// Size limits.
    config: AccumulatorConfig,
    /// Consumer of completed frames.
    sink: S,
    /// Set once a size limit has failed the session.
    failed: bool,
}

impl<S: FrameSink> FrameAccumulator<S> {
    /// Create a new accumulator with default settings.
    ///
    /// Default capacity: 64KB, max frame size: 16MB.
    pub fn new(sink: S) -> Self {
        Self::with_config(sink, AccumulatorConfig::default())
    }

    /// Create a new accumulator with a custom max frame size.
    pub fn with_max_frame_size(sink: S, max_frame_size: usize) -> Self {
        Self::with_config(
            sink,
            AccumulatorConfig::default().with_max_frame_size(max_frame_size),
        )
    }

    /// Create a new accumulator from a full config.
    pub fn with_config(sink: S, config: AccumulatorConfig) -> Self {
        Self {
            buffer: BytesMut::with_capacity(config.initial_capacity),
            state: State::Waiting,
            config,
            sink,
            failed: false,
        }
    }

    /// Feed bytes into the accumulator and emit all complete frames.
    ///
    /// This is the main API for processing incoming data. Frames are handed
    /// to the sink in stream order before this returns. If data ends inside
    /// a frame, the partial frame is kept for the next call. An empty slice
    /// is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `FrameTooLarge` or `TextFrameTooLarge` if a frame exceeds
    /// `max_frame_size`. The sink receives the same error via
    /// [`FrameSink::on_error`], the pending bytes are dropped, and every later
    /// call returns `SessionFailed` until [`reset`](Self::reset).
    pub fn feed(&mut self, data: &[u8]) -> Result<()> {
        if self.failed {
            return Err(DemuxError::SessionFailed);
        }
        if data.is_empty() {
            return Ok(());
        }

        self.buffer.extend_from_slice(data);

        loop {
            match self.try_extract_one() {
                Ok(Some(frame)) => self.sink.on_frame(frame),
                Ok(None) => return Ok(()),
                Err(e) => return Err(self.fail(e)),
            }
        }
    }

    /// Try to extract a single frame from the buffer.
    ///
    /// Returns:
    /// - `Ok(Some(frame))` if a complete frame was extracted
    /// - `Ok(None)` if more data is needed
    /// - `Err(...)` if a frame exceeds the configured size
    fn try_extract_one(&mut self) -> Result<Option<Frame>> {
        // Each pass either returns or advances the state, and the state can
        // only advance twice (Waiting -> ReadingBinary -> length known)
        // before returning.
        loop {
            match self.state {
                State::Waiting => {
                    let Some(&first) = self.buffer.first() else {
                        return Ok(None);
                    };
                    self.state = match FrameKind::detect(first) {
                        FrameKind::Binary => State::ReadingBinary { payload_len: None },
                        FrameKind::Text => State::ReadingText { scanned: 0 },
                    };
                    tracing::trace!(state = ?self.state, "frame started");
                }

                State::ReadingBinary { payload_len: None } => {
                    let Some(declared) = decode_binary_length(&self.buffer) else {
                        return Ok(None);
                    };

                    if declared as usize > self.config.max_frame_size {
                        return Err(DemuxError::FrameTooLarge {
                            declared,
                            max: self.config.max_frame_size,
                        });
                    }

                    self.state = State::ReadingBinary {
                        payload_len: Some(declared),
                    };
                }

                State::ReadingBinary {
                    payload_len: Some(len),
                } => {
                    let len = len as usize;
                    if self.buffer.len() < BINARY_HEADER_SIZE + len {
                        return Ok(None);
                    }

                    self.buffer.advance(BINARY_HEADER_SIZE);
                    let payload = self.buffer.split_to(len).freeze();
                    self.state = State::Waiting;

                    tracing::trace!(len, "binary frame complete");
                    return Ok(Some(Frame::new(FrameKind::Binary, payload)));
                }

                State::ReadingText { scanned } => {
                    let max = self.config.max_frame_size;

                    let Some(end) = find_terminator(&self.buffer, resume_offset(scanned)) else {
                        // Any terminator still to come starts at or after this offset.
                        let min_payload = resume_offset(self.buffer.len());
                        if min_payload > max {
                            return Err(DemuxError::TextFrameTooLarge {
                                buffered: min_payload,
                                max,
                            });
                        }
                        self.state = State::ReadingText {
                            scanned: self.buffer.len(),
                        };
                        return Ok(None);
                    };

                    if end > max {
                        return Err(DemuxError::TextFrameTooLarge { buffered: end, max });
                    }

                    let payload = self.buffer.split_to(end).freeze();
                    self.buffer.advance(TEXT_TERMINATOR.len());
                    self.state = State::Waiting;

                    tracing::trace!(len = end, "text frame complete");
                    return Ok(Some(Frame::new(FrameKind::Text, payload)));
                }
            }
        }
    }

    /// Report `error` to the sink and poison the session.
    fn fail(&mut self, error: DemuxError) -> DemuxError {
        tracing::warn!("Failing frame session: {}", error);
        self.sink.on_error(&error);
        self.buffer.clear();
        self.state = State::Waiting;
        self.failed = true;
        error
    }

    /// Discard any partial frame and clear a failed session.
    pub fn reset(&mut self) {
        tracing::debug!(discarded = self.buffer.len(), "accumulator reset");
        self.buffer.clear();
        self.state = State::Waiting;
        self.failed = false;
    }

    /// Get the current parser state.
    pub fn state(&self) -> ParserState {
        match self.state {
            State::Waiting => ParserState::Waiting,
            State::ReadingText { .. } => ParserState::ReadingText,
            State::ReadingBinary { .. } => ParserState::ReadingBinary,
        }
    }

    /// Declared payload length of the binary frame in progress.
    ///
    /// `None` unless a binary header has been fully received.
    pub fn declared_length(&self) -> Option<u32> {
        match self.state {
            State::ReadingBinary { payload_len } => payload_len,
            _ => None,
        }
    }

    /// Get the number of buffered bytes.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Whether a size limit has failed the session.
    pub fn is_failed(&self) -> bool {
        self.failed
    }

    /// Get the accumulator config.
    pub fn config(&self) -> &AccumulatorConfig {
        &self.config
    }

    /// Get a reference to the sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Get a mutable reference to the sink.
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Consume the accumulator, discarding any partial frame.
    pub fn into_sink(self) -> S {
        self.sink
    }
}

impl<S: FrameSink + Default> Default for FrameAccumulator<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}
