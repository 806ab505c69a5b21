//! Accumulator configuration.
//!
//! # Configuration
//!
//! - `max_frame_size`: Largest payload accepted for either frame kind (default: 16 MiB)
//! - `initial_capacity`: Pending buffer capacity reserved up front (default: 64 KiB)
//!
//! # Example
//!
//! ```
//! use frame_demux::AccumulatorConfig;
//!
//! let config = AccumulatorConfig::from_json_str(r#"{"max_frame_size": 1024}"#).unwrap();
//! assert_eq!(config.max_frame_size, 1024);
//! assert_eq!(config.initial_capacity, 64 * 1024);
//! ```

use serde::Deserialize;

use crate::error::Result;
use crate::protocol::{DEFAULT_INITIAL_CAPACITY, DEFAULT_MAX_FRAME_SIZE};

/// Limits and sizing for a [`FrameAccumulator`](crate::FrameAccumulator).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AccumulatorConfig {
    /// Maximum payload size of a single frame.
    ///
    /// A binary header declaring more, or a text frame growing past it,
    /// fails the session.
    pub max_frame_size: usize,
    /// Capacity reserved for the pending buffer at construction.
    pub initial_capacity: usize,
}

impl AccumulatorConfig {
    /// Create a config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum frame payload size.
    pub fn with_max_frame_size(mut self, max_frame_size: usize) -> Self {
        self.max_frame_size = max_frame_size;
        self
    }

    /// Set the initial pending buffer capacity.
    pub fn with_initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }

    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Default for AccumulatorConfig {
    fn default() -> Self {
        Self {
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AccumulatorConfig::default();
        assert_eq!(config.max_frame_size, 16 * 1024 * 1024);
        assert_eq!(config.initial_capacity, 64 * 1024);
        assert_eq!(AccumulatorConfig::new(), config);
    }

    #[test]
    fn test_builder_methods() {
        let config = AccumulatorConfig::new()
            .with_max_frame_size(100)
            .with_initial_capacity(8);
        assert_eq!(config.max_frame_size, 100);
        assert_eq!(config.initial_capacity, 8);
    }

    #[test]
    fn test_from_json_full() {
        let config =
            AccumulatorConfig::from_json_str(r#"{"max_frame_size": 10, "initial_capacity": 4}"#)
                .unwrap();
        assert_eq!(config.max_frame_size, 10);
        assert_eq!(config.initial_capacity, 4);
    }

    #[test]
    fn test_from_json_empty_object_uses_defaults() {
        let config = AccumulatorConfig::from_json_str("{}").unwrap();
        assert_eq!(config, AccumulatorConfig::default());
    }

    #[test]
    fn test_from_json_rejects_unknown_field() {
        let result = AccumulatorConfig::from_json_str(r#"{"max_payload": 10}"#);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("JSON error"));
    }
}
