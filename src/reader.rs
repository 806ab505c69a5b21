//! Read loops that drive an accumulator from a byte source.
//!
//! The accumulator itself never performs I/O. These helpers read a source
//! to end-of-stream in fixed-size chunks and feed every chunk, in order,
//! to one accumulator.
//!
//! # Example
//!
//! ```
//! use frame_demux::{reader::pump, FrameAccumulator, FrameCollector};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let mut acc = FrameAccumulator::new(FrameCollector::new());
//! let input: &[u8] = b"one\r\n\r\ntwo\r\n\r\n";
//!
//! let total = pump(input, &mut acc).await.unwrap();
//! assert_eq!(total, 14);
//! assert_eq!(acc.sink().len(), 2);
//! # }
//! ```

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::{DemuxError, Result};
use crate::protocol::FrameAccumulator;
use crate::sink::FrameSink;

/// Read buffer size for one chunk.
pub const READ_CHUNK_SIZE: usize = 64 * 1024;

/// Feed everything read from `reader` into `accumulator` until EOF.
///
/// Returns the total number of bytes read. A partial frame left at EOF
/// stays buffered in the accumulator.
///
/// # Errors
///
/// Returns the I/O error from the reader, or the error that failed the
/// accumulator session.
pub async fn pump<R, S>(mut reader: R, accumulator: &mut FrameAccumulator<S>) -> Result<u64>
where
    R: AsyncRead + Unpin,
    S: FrameSink,
{
    let mut buf = vec![0u8; READ_CHUNK_SIZE];
    let mut total: u64 = 0;

    loop {
        let n = match reader.read(&mut buf).await {
            Ok(0) => break, // EOF
            Ok(n) => n,
            Err(e) => return Err(DemuxError::Io(e)),
        };

        total += n as u64;
        accumulator.feed(&buf[..n])?;
    }

    log_partial_frame(accumulator);
    Ok(total)
}

/// Blocking variant of [`pump`] for `std::io::Read` sources.
pub fn pump_blocking<R, S>(mut reader: R, accumulator: &mut FrameAccumulator<S>) -> Result<u64>
where
    R: std::io::Read,
    S: FrameSink,
{
    let mut buf = vec![0u8; READ_CHUNK_SIZE];
    let mut total: u64 = 0;

    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(DemuxError::Io(e)),
        };

        total += n as u64;
        accumulator.feed(&buf[..n])?;
    }

    log_partial_frame(accumulator);
    Ok(total)
}

fn log_partial_frame<S: FrameSink>(accumulator: &FrameAccumulator<S>) {
    if !accumulator.is_empty() {
        tracing::debug!(
            pending = accumulator.len(),
            "stream ended inside a partial frame"
        );
    }
}
