//! # frame-demux
//!
//! Incremental demultiplexer for a byte stream that carries two kinds of
//! frames back to back:
//!
//! - **Binary**: `0x24` marker, u32 Little Endian length, payload
//! - **Text**: payload terminated by `\r\n\r\n`
//!
//! Bytes may arrive in any chunking. A [`FrameAccumulator`] buffers them and
//! hands every completed frame to a [`FrameSink`], exactly once and in stream
//! order, from inside the `feed` call that completed it.
//!
//! ## Example
//!
//! ```
//! use frame_demux::{FrameAccumulator, FrameCollector, FrameKind};
//!
//! let mut acc = FrameAccumulator::new(FrameCollector::new());
//!
//! acc.feed(b"hel").unwrap();
//! acc.feed(b"lo\r\n\r\n$\x05\x00\x00\x00ab").unwrap();
//! acc.feed(b"cde").unwrap();
//!
//! let frames = acc.into_sink().take_frames();
//! assert_eq!(frames[0].kind(), FrameKind::Text);
//! assert_eq!(frames[0].payload(), b"hello");
//! assert_eq!(frames[1].kind(), FrameKind::Binary);
//! assert_eq!(frames[1].payload(), b"abcde");
//! ```

pub mod config;
pub mod error;
pub mod protocol;
pub mod reader;
pub mod sink;

pub use config::AccumulatorConfig;
pub use error::DemuxError;
pub use protocol::{Frame, FrameAccumulator, FrameKind, ParserState};
pub use sink::{FrameCollector, FrameSink, JsonLinesSink};
