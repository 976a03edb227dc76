// Copyright 2025-2026 CEMAXECUTER LLC

use std::io::{self, Write};
use std::time::Instant;

use clap::Args;

use brf_dsp::power;
use brf_output::IqWriter;
use brf_sdr::samples::to_complex;
use brf_sdr::{Disposition, LnaGain};

use crate::units::{parse_hz, parse_hz_u32};

#[derive(Args, Debug)]
pub struct RxArgs {
    /// Center frequency in Hz (suffixes k, M, G accepted)
    #[arg(value_parser = parse_hz)]
    pub frequency: u64,

    /// Device identifier; empty opens the first device
    #[arg(short = 'd', long, default_value = "")]
    pub device: String,

    /// File to write samples to, `-` for stdout
    #[arg(short = 'f', long, default_value = "-")]
    pub file: String,

    /// Bandwidth in Hz
    #[arg(short = 'b', long, default_value = "7000000", value_parser = parse_hz_u32)]
    pub bandwidth: u32,

    /// Sample rate in samples per second
    #[arg(short = 's', long, default_value = "10000000", value_parser = parse_hz_u32)]
    pub sample_rate: u32,

    /// Number of stream buffers
    #[arg(short = 'n', long, default_value_t = 32)]
    pub num_buffers: usize,

    /// Number of in-flight transfers
    #[arg(short = 't', long, default_value_t = 1)]
    pub num_transfers: usize,

    /// Samples per stream buffer
    #[arg(short = 'l', long, default_value_t = 4096)]
    pub num_samples: usize,

    /// LNA gain: bypass, mid, max
    #[arg(short = 'g', long, default_value = "LNA_GAIN_MAX")]
    pub lna_gain: LnaGain,

    #[arg(short = 'o', long, default_value_t = 21)]
    pub vga1_gain: i32,

    #[arg(short = 'w', long, default_value_t = 17)]
    pub vga2_gain: i32,

    /// Squelch in dBFS; 0 disables it
    #[arg(short = 'q', long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub squelch: f64,

    /// Stop after this many seconds
    #[arg(long)]
    pub duration: Option<f64>,

    /// Stop after writing this many samples
    #[arg(long)]
    pub max_samples: Option<u64>,
}

/// Per-buffer recording policy for the RX stream.
///
/// Squelched buffers are not written and the same buffer is handed back to
/// the driver; everything else is written and the ring moves on.
pub struct Recorder<W: Write> {
    writer: IqWriter<W>,
    squelch_db: f64,
    max_samples: Option<u64>,
    deadline: Option<Instant>,
    squelched: u64,
    error: Option<io::Error>,
}

impl<W: Write> Recorder<W> {
    pub fn new(
        writer: IqWriter<W>,
        squelch_db: f64,
        max_samples: Option<u64>,
        deadline: Option<Instant>,
    ) -> Self {
        Self {
            writer,
            squelch_db,
            max_samples,
            deadline,
            squelched: 0,
            error: None,
        }
    }

    pub fn on_buffer(&mut self, samples: &[i16]) -> Disposition {
        if self.deadline.map_or(false, |d| Instant::now() >= d) {
            return Disposition::Shutdown;
        }

        let num_samples = samples.len() / 2;
        if power::squelched(&to_complex(samples, num_samples), self.squelch_db) {
            self.squelched += 1;
            return Disposition::Rearm;
        }

        let take = match self.max_samples {
            Some(max) => {
                let left = max.saturating_sub(self.writer.samples_written());
                num_samples.min(usize::try_from(left).unwrap_or(usize::MAX))
            }
            None => num_samples,
        };
        if let Err(e) = self.writer.write_samples(&samples[..take * 2]) {
            self.error = Some(e);
            return Disposition::Shutdown;
        }

        match self.max_samples {
            Some(max) if self.writer.samples_written() >= max => Disposition::Shutdown,
            _ => Disposition::Advance,
        }
    }

    pub fn squelched(&self) -> u64 {
        self.squelched
    }

    pub fn samples_written(&self) -> u64 {
        self.writer.samples_written()
    }

    /// Flush the output and surface any write error seen while streaming.
    pub fn finish(&mut self) -> io::Result<()> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }
        self.writer.flush()
    }
}

#[cfg(feature = "bladerf")]
pub fn run(args: &RxArgs) -> Result<(), String> {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use brf_output::iq;
    use brf_sdr::{Device, Format, Metadata, StreamConfig};

    let dev = Device::open(&args.device).map_err(|e| format!("failed to open device: {}", e))?;
    let rx = dev.rx();
    rx.set_enabled(true).map_err(|e| format!("failed to enable RX: {}", e))?;
    rx.set_frequency(args.frequency)
        .map_err(|e| format!("failed to set frequency: {}", e))?;
    rx.set_bandwidth(args.bandwidth)
        .map_err(|e| format!("failed to set bandwidth: {}", e))?;
    rx.set_sample_rate(args.sample_rate)
        .map_err(|e| format!("failed to set sample rate: {}", e))?;
    dev.set_lna_gain(args.lna_gain)
        .map_err(|e| format!("failed to set LNA gain: {}", e))?;
    rx.set_vga1(args.vga1_gain)
        .map_err(|e| format!("failed to set VGA1: {}", e))?;
    rx.set_vga2(args.vga2_gain)
        .map_err(|e| format!("failed to set VGA2: {}", e))?;

    let writer = iq::create(&args.file).map_err(|e| format!("failed to create {}: {}", args.file, e))?;
    let deadline = match args.duration {
        Some(secs) => Some(
            Instant::now()
                + Duration::try_from_secs_f64(secs)
                    .map_err(|e| format!("invalid duration {}: {}", secs, e))?,
        ),
        None => None,
    };
    let recorder = Arc::new(Mutex::new(Recorder::new(
        writer,
        args.squelch,
        args.max_samples,
        deadline,
    )));

    let shared = recorder.clone();
    let handler = move |_meta: &Metadata, samples: &mut [i16]| -> Disposition {
        match shared.lock() {
            Ok(mut rec) => rec.on_buffer(samples),
            Err(_) => Disposition::Shutdown,
        }
    };
    let config = StreamConfig {
        format: Format::Sc16Q11,
        num_buffers: args.num_buffers,
        samples_per_buffer: args.num_samples,
        num_transfers: args.num_transfers,
    };

    log::info!(
        "recording {} Hz at {} S/s to {}",
        args.frequency,
        args.sample_rate,
        args.file
    );
    let mut stream = rx
        .stream(handler, &config)
        .map_err(|e| format!("failed to start stream: {}", e))?;
    let result = stream.run();
    drop(stream);

    if let Err(e) = rx.set_enabled(false) {
        log::warn!("failed to disable RX: {}", e);
    }

    let mut rec = recorder
        .lock()
        .map_err(|_| "recorder state poisoned".to_string())?;
    rec.finish().map_err(|e| format!("write failed: {}", e))?;
    log::info!(
        "wrote {} samples, {} buffers squelched",
        rec.samples_written(),
        rec.squelched()
    );
    result.map_err(|e| format!("stream error: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn loud(n: usize) -> Vec<i16> {
        brf_sdr::samples::constant(n, 1024, 0)
    }

    #[test]
    fn test_squelch_rearms_without_writing() {
        let mut rec = Recorder::new(IqWriter::new(Vec::new()), -30.0, None, None);
        assert_eq!(rec.on_buffer(&[1, 0, 0, 1, 1, 1, 0, 0]), Disposition::Rearm);
        assert_eq!(rec.squelched(), 1);
        assert_eq!(rec.samples_written(), 0);

        assert_eq!(rec.on_buffer(&loud(4)), Disposition::Advance);
        assert_eq!(rec.samples_written(), 4);
    }

    #[test]
    fn test_zero_squelch_writes_silence() {
        let mut rec = Recorder::new(IqWriter::new(Vec::new()), 0.0, None, None);
        assert_eq!(rec.on_buffer(&[0; 8]), Disposition::Advance);
        assert_eq!(rec.samples_written(), 4);
    }

    #[test]
    fn test_max_samples_truncates_and_stops() {
        let mut rec = Recorder::new(IqWriter::new(Vec::new()), 0.0, Some(6), None);
        assert_eq!(rec.on_buffer(&loud(4)), Disposition::Advance);
        assert_eq!(rec.on_buffer(&loud(4)), Disposition::Shutdown);
        assert_eq!(rec.samples_written(), 6);
        rec.finish().unwrap();
    }

    #[test]
    fn test_deadline_stops() {
        let past = Instant::now() - Duration::from_millis(1);
        let mut rec = Recorder::new(IqWriter::new(Vec::new()), 0.0, None, Some(past));
        assert_eq!(rec.on_buffer(&loud(4)), Disposition::Shutdown);
        assert_eq!(rec.samples_written(), 0);
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_error_surfaces_on_finish() {
        let mut rec = Recorder::new(IqWriter::new(Broken), 0.0, None, None);
        assert_eq!(rec.on_buffer(&loud(2)), Disposition::Shutdown);
        assert_eq!(rec.finish().unwrap_err().kind(), io::ErrorKind::BrokenPipe);
    }
}
