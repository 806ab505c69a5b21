//! Demo - demultiplex a fixed mixed buffer, or stdin.
//!
//! This example demonstrates:
//! - Building an accumulator around a console sink
//! - Feeding a buffer holding text and binary frames back to back
//! - Pumping an async reader through the same accumulator
//!
//! Frames are printed to stdout as JSON lines; logs go to stderr.
//!
//! ```text
//! cargo run --example demo
//! printf 'hi\r\n\r\n' | cargo run --example demo -- -
//! ```

use frame_demux::reader::pump;
use frame_demux::{FrameAccumulator, JsonLinesSink};
use tracing_subscriber::EnvFilter;

/// Fixed input: two text frames, a 5-byte binary frame, a text frame and a
/// trailing NUL that starts a frame which never completes.
const DEMO_BUFFER: &[u8] = b"hello\r\n\r\nworld2\r\n\r\n$\x05\x00\x00\x00binarfoobarbaz\r\n\r\n\x00";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let sink = JsonLinesSink::new(std::io::stdout());
    let mut acc = FrameAccumulator::new(sink);

    if std::env::args().nth(1).as_deref() == Some("-") {
        let total = pump(tokio::io::stdin(), &mut acc).await?;
        tracing::info!(total, "stdin drained");
    } else {
        acc.feed(DEMO_BUFFER)?;
    }

    if !acc.is_empty() {
        tracing::info!(
            pending = acc.len(),
            state = ?acc.state(),
            "partial frame left at end of input"
        );
    }

    if let Some(e) = acc.sink_mut().take_error() {
        return Err(e.into());
    }

    Ok(())
}
