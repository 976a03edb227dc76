// Copyright 2025-2026 CEMAXECUTER LLC

pub mod burst;
pub mod config;
pub mod error;
pub mod file;
pub mod meta;
pub mod metadata;
pub mod ring;
pub mod samples;
pub mod types;

#[cfg(feature = "bladerf")]
pub mod bladerf;
#[cfg(feature = "bladerf")]
pub mod device;
#[cfg(feature = "bladerf")]
mod ffi;
#[cfg(feature = "bladerf")]
pub mod stream;

pub use config::{StreamConfig, SyncConfig};
pub use error::{Error, Result};
pub use metadata::Metadata;
pub use ring::Disposition;
pub use types::{
    CalModule, Correction, ExpansionBoard, Format, LnaGain, LogLevel, LpfMode, Module, Sampling,
    Xb200Filter, Xb200Path,
};

#[cfg(feature = "bladerf")]
pub use device::{Channel, Device, DeviceInfo};

use crossbeam::channel::Sender;

/// Sample buffer: a block of interleaved SC16 Q11 IQ samples
#[derive(Debug, Clone)]
pub struct SampleBuf {
    /// Interleaved I,Q,I,Q,... as i16 in [-2048, 2047]
    pub data: Vec<i16>,
    /// Number of complex samples (data.len() / 2)
    pub num_samples: usize,
    /// Hardware timestamp or sample offset of the first sample, when known
    pub timestamp: Option<u64>,
}

/// Common trait for sample producers
pub trait SdrSource: Send {
    /// Start streaming samples into the channel.
    /// Runs until stop() is called, the input ends, or an error occurs.
    fn start(&mut self, tx: Sender<SampleBuf>) -> Result<()>;

    /// Signal the source to stop streaming
    fn stop(&mut self);

    /// Get the sample rate in Hz
    fn sample_rate(&self) -> u32;

    /// Get the center frequency in Hz
    fn center_frequency(&self) -> u64;
}
