// Copyright 2025-2026 CEMAXECUTER LLC

use serde::{Deserialize, Serialize};

use crate::types::Format;

/// Parameters for `bladerf_sync_config`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    pub format: Format,
    pub num_buffers: u32,
    /// Samples per buffer; must be a multiple of 1024
    pub buffer_size: u32,
    /// Must be less than `num_buffers`
    pub num_transfers: u32,
    pub timeout_ms: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            format: Format::Sc16Q11,
            num_buffers: 16,
            buffer_size: 8192,
            num_transfers: 8,
            timeout_ms: 3500,
        }
    }
}

/// Parameters for `bladerf_init_stream`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamConfig {
    pub format: Format,
    pub num_buffers: usize,
    pub samples_per_buffer: usize,
    pub num_transfers: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            format: Format::Sc16Q11,
            num_buffers: 16,
            samples_per_buffer: 8192,
            num_transfers: 8,
        }
    }
}

impl StreamConfig {
    /// Interleaved i16 values per buffer.
    pub fn values_per_buffer(&self) -> usize {
        self.samples_per_buffer * 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_keep_transfers_below_buffers() {
        let sync = SyncConfig::default();
        assert!(sync.num_transfers < sync.num_buffers);
        assert_eq!(sync.buffer_size % 1024, 0);

        let stream = StreamConfig::default();
        assert!(stream.num_transfers < stream.num_buffers);
        assert_eq!(stream.values_per_buffer(), 16384);
    }
}
