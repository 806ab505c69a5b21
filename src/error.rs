//! Error types for frame-demux.

use thiserror::Error;

/// Main error type for all demultiplexer operations.
#[derive(Debug, Error)]
pub enum DemuxError {
    /// I/O error while reading the input stream or writing sink output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error (config and JSON sink).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A binary header declared a payload larger than the configured bound.
    #[error("Binary frame length {declared} exceeds maximum {max}")]
    FrameTooLarge { declared: u32, max: usize },

    /// A text frame grew past the configured bound without terminating.
    #[error("Text frame of at least {buffered} bytes exceeds maximum {max}")]
    TextFrameTooLarge { buffered: usize, max: usize },

    /// A binary payload is too long for the u32 length field.
    #[error("Payload length {len} does not fit the binary length field")]
    PayloadTooLong { len: usize },

    /// A text payload cannot be framed unambiguously.
    #[error("Invalid text payload: {0}")]
    InvalidTextPayload(String),

    /// The session already failed; bytes are no longer accepted until reset.
    #[error("Session failed")]
    SessionFailed,
}

/// Result type alias using DemuxError.
pub type Result<T> = std::result::Result<T, DemuxError>;
