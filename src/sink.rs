//! Frame sinks - consumers notified once per completed frame.
//!
//! Provides:
//! - [`FrameSink`] - the capability an accumulator drives
//! - [`FrameCollector`] - records frames and errors in order
//! - [`JsonLinesSink`] - writes one JSON object per frame to any `Write`
//!
//! A sink is owned (or mutably borrowed) by its accumulator for as long as
//! frames flow, so it cannot call back into the accumulator while a
//! notification is in progress.
//!
//! # Example
//!
//! ```
//! use frame_demux::{FrameAccumulator, FrameCollector};
//!
//! let mut collector = FrameCollector::new();
//! let mut acc = FrameAccumulator::new(&mut collector);
//! acc.feed(b"hello\r\n\r\n").unwrap();
//! drop(acc);
//!
//! assert_eq!(collector.frames()[0].payload(), b"hello");
//! ```

use std::io::Write;

use serde::Serialize;

use crate::error::DemuxError;
use crate::protocol::{Frame, FrameKind};

/// Consumer of completed frames.
///
/// Called synchronously from inside [`FrameAccumulator::feed`](crate::FrameAccumulator::feed),
/// once per frame, in stream order.
pub trait FrameSink {
    /// Receive one completed frame.
    fn on_frame(&mut self, frame: Frame);

    /// Receive the error that failed the session.
    ///
    /// Called at most once per session.
    fn on_error(&mut self, _error: &DemuxError) {}
}

impl<S: FrameSink + ?Sized> FrameSink for &mut S {
    fn on_frame(&mut self, frame: Frame) {
        (**self).on_frame(frame)
    }

    fn on_error(&mut self, error: &DemuxError) {
        (**self).on_error(error)
    }
}

impl<S: FrameSink + ?Sized> FrameSink for Box<S> {
    fn on_frame(&mut self, frame: Frame) {
        (**self).on_frame(frame)
    }

    fn on_error(&mut self, error: &DemuxError) {
        (**self).on_error(error)
    }
}

/// Sink that keeps every frame and error it is given.
#[derive(Debug, Default)]
pub struct FrameCollector {
    frames: Vec<Frame>,
    errors: Vec<String>,
}

impl FrameCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames received so far, in arrival order.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Display strings of the errors received so far.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Take the collected frames, leaving the collector empty.
    pub fn take_frames(&mut self) -> Vec<Frame> {
        std::mem::take(&mut self.frames)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl FrameSink for FrameCollector {
    fn on_frame(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    fn on_error(&mut self, error: &DemuxError) {
        self.errors.push(error.to_string());
    }
}

/// One output line of [`JsonLinesSink`].
#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "lowercase")]
enum Record<'a> {
    Frame {
        kind: FrameKind,
        size: usize,
        #[serde(skip_serializing_if = "Option::is_none")]
        text: Option<std::borrow::Cow<'a, str>>,
    },
    Error {
        message: String,
    },
}

/// Sink writing one JSON object per notification to a writer.
///
/// Text payloads are included (lossily decoded as UTF-8); binary payloads
/// are reported by size only. Lines end with a single `\n` and are flushed
/// immediately.
///
/// Write failures cannot be returned through [`FrameSink`]; the first one is
/// kept and later notifications are dropped. Check [`JsonLinesSink::take_error`].
pub struct JsonLinesSink<W: Write> {
    writer: W,
    error: Option<DemuxError>,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            error: None,
        }
    }

    /// Take the first write error, if any.
    pub fn take_error(&mut self) -> Option<DemuxError> {
        self.error.take()
    }

    /// Get a reference to the underlying writer.
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Consume the sink, returning the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_record(&mut self, record: &Record<'_>) {
        if self.error.is_some() {
            return;
        }
        if let Err(e) = self.try_write_record(record) {
            tracing::warn!("JSON sink write failed: {}", e);
            self.error = Some(e);
        }
    }

    fn try_write_record(&mut self, record: &Record<'_>) -> crate::error::Result<()> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

impl<W: Write> FrameSink for JsonLinesSink<W> {
    fn on_frame(&mut self, frame: Frame) {
        let text = frame.is_text().then(|| frame.text_lossy());
        self.write_record(&Record::Frame {
            kind: frame.kind(),
            size: frame.payload_len(),
            text,
        });
    }

    fn on_error(&mut self, error: &DemuxError) {
        self.write_record(&Record::Error {
            message: error.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collector_records_in_order() {
        let mut collector = FrameCollector::new();
        collector.on_frame(Frame::text(b"one"));
        collector.on_frame(Frame::binary(b"two"));

        assert_eq!(collector.len(), 2);
        assert!(collector.frames()[0].is_text());
        assert!(collector.frames()[1].is_binary());
        assert!(collector.errors().is_empty());

        let frames = collector.take_frames();
        assert_eq!(frames.len(), 2);
        assert!(collector.is_empty());
    }

    #[test]
    fn test_collector_records_errors() {
        let mut collector = FrameCollector::new();
        collector.on_error(&DemuxError::SessionFailed);
        assert_eq!(collector.errors(), ["Session failed"]);
    }

    fn notify_both<S: FrameSink>(mut sink: S) {
        sink.on_frame(Frame::text(b"x"));
        sink.on_error(&DemuxError::SessionFailed);
    }

    #[test]
    fn test_mut_ref_forwards() {
        let mut collector = FrameCollector::new();
        notify_both(&mut collector);

        assert_eq!(collector.len(), 1);
        assert_eq!(collector.errors().len(), 1);
    }

    #[test]
    fn test_boxed_sink_forwards() {
        let mut boxed = Box::new(FrameCollector::new());
        notify_both(&mut boxed);

        assert_eq!(boxed.frames(), [Frame::text(b"x")]);
        assert_eq!(boxed.errors(), ["Session failed"]);
    }

    #[test]
    fn test_json_sink_text_frame() {
        let mut sink = JsonLinesSink::new(Vec::new());
        sink.on_frame(Frame::text(b"hello"));

        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(
            out,
            "{\"event\":\"frame\",\"kind\":\"text\",\"size\":5,\"text\":\"hello\"}\n"
        );
    }

    #[test]
    fn test_json_sink_binary_frame_omits_payload() {
        let mut sink = JsonLinesSink::new(Vec::new());
        sink.on_frame(Frame::binary(b"\x00\x01\x02"));

        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(out, "{\"event\":\"frame\",\"kind\":\"binary\",\"size\":3}\n");
    }

    #[test]
    fn test_json_sink_error_event() {
        let mut sink = JsonLinesSink::new(Vec::new());
        sink.on_error(&DemuxError::SessionFailed);

        let out = String::from_utf8(sink.get_ref().clone()).unwrap();
        let value: serde_json::Value = serde_json::from_str(out.trim_end()).unwrap();
        assert_eq!(value["event"], "error");
        assert_eq!(value["message"], "Session failed");
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_json_sink_keeps_first_write_error() {
        let mut sink = JsonLinesSink::new(FailingWriter);
        sink.on_frame(Frame::text(b"a"));
        sink.on_frame(Frame::text(b"b"));

        let err = sink.take_error().unwrap();
        assert!(err.to_string().contains("closed"));
        assert!(sink.take_error().is_none());
    }
}
