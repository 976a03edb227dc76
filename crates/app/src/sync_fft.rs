// Copyright 2025-2026 CEMAXECUTER LLC

use clap::Args;

use brf_dsp::Window;

use crate::units::{parse_hz, parse_hz_u32};

#[derive(Args, Debug)]
pub struct SyncFftArgs {
    #[arg(short = 'd', long, default_value = "")]
    pub device: String,

    #[arg(short = 'c', long, default_value = "440M", value_parser = parse_hz)]
    pub frequency: u64,

    #[arg(short = 'b', long, default_value = "2.8M", value_parser = parse_hz_u32)]
    pub bandwidth: u32,

    #[arg(short = 's', long, default_value = "4M", value_parser = parse_hz_u32)]
    pub sample_rate: u32,

    #[arg(long, default_value_t = 16)]
    pub num_buffers: u32,

    #[arg(long, default_value_t = 8)]
    pub num_transfers: u32,

    /// Samples per receive; the FFT covers the first half
    #[arg(long, default_value_t = 1 << 16, value_parser = clap::value_parser!(u32).range(2..))]
    pub buffer_size: u32,

    #[arg(long, default_value_t = 3500)]
    pub timeout_ms: u32,

    #[arg(short = 'a', long, default_value_t = 100)]
    pub averaging: usize,

    #[arg(long, default_value = "hann")]
    pub window: Window,

    /// Stop after this many receives
    #[arg(long)]
    pub frames: Option<u64>,

    #[arg(long, default_value_t = 200)]
    pub refresh_ms: u64,

    #[arg(long, default_value_t = 100)]
    pub width: usize,

    #[arg(long, default_value_t = 24)]
    pub height: usize,
}

impl SyncFftArgs {
    pub fn fft_size(&self) -> usize {
        (self.buffer_size as usize / 2).max(1)
    }
}

#[cfg(feature = "bladerf")]
pub fn run(args: &SyncFftArgs) -> Result<(), String> {
    use std::time::{Duration, Instant};

    use brf_sdr::samples::to_complex;
    use brf_sdr::{Device, Format, Metadata, SyncConfig};

    use crate::display::SpectrumView;

    let dev = Device::open(&args.device).map_err(|e| format!("failed to open device: {}", e))?;
    let rx = dev.rx();
    rx.set_frequency(args.frequency)
        .map_err(|e| format!("failed to set frequency: {}", e))?;
    let bandwidth = rx
        .set_bandwidth(args.bandwidth)
        .map_err(|e| format!("failed to set bandwidth: {}", e))?;
    let rate = rx
        .set_sample_rate(args.sample_rate)
        .map_err(|e| format!("failed to set sample rate: {}", e))?;

    let sync = SyncConfig {
        format: Format::Sc16Q11Meta,
        num_buffers: args.num_buffers,
        buffer_size: args.buffer_size,
        num_transfers: args.num_transfers,
        timeout_ms: args.timeout_ms,
    };
    rx.configure_sync(&sync)
        .map_err(|e| format!("failed to configure sync RX: {}", e))?;
    rx.set_enabled(true).map_err(|e| format!("failed to enable RX: {}", e))?;
    log::info!(
        "sync RX at {} Hz, bw {} Hz, {} S/s, FFT {}",
        args.frequency,
        bandwidth,
        rate,
        args.fft_size()
    );

    let nfft = args.fft_size();
    let mut view = SpectrumView::new(
        nfft,
        args.window,
        args.averaging,
        args.frequency,
        rate,
        format!(
            "{:.3} MHz, {} MS/s, sync avg {}",
            args.frequency as f64 / 1e6,
            f64::from(rate) / 1e6,
            args.averaging
        ),
    );
    view.set_size(args.width, args.height);

    let mut samples = vec![0i16; args.buffer_size as usize * 2];
    let refresh = Duration::from_millis(args.refresh_ms);
    let mut last_draw: Option<Instant> = None;
    let mut frames: u64 = 0;
    let mut overruns: u64 = 0;

    let result = loop {
        if args.frames.map_or(false, |max| frames >= max) {
            break Ok(());
        }
        let mut meta = Metadata::rx_now();
        if let Err(e) = rx.receive(&mut samples, Some(&mut meta), args.timeout_ms) {
            break Err(format!("receive failed: {}", e));
        }
        if meta.overrun() {
            overruns += 1;
            log::debug!("overrun before timestamp {}", meta.timestamp);
        }
        frames += 1;

        let count = (meta.actual_count as usize).min(nfft);
        if !view.push(&to_complex(&samples, count)) {
            log::debug!("skipping non-finite frame {}", frames);
        }

        if last_draw.map_or(true, |t| t.elapsed() >= refresh) {
            let status = format!("frames {}  overruns {}  skipped {}", frames, overruns, view.rejected());
            if let Err(e) = view.draw(&status) {
                break Err(format!("display error: {}", e));
            }
            last_draw = Some(Instant::now());
        }
    };

    if let Err(e) = rx.set_enabled(false) {
        log::warn!("failed to disable RX: {}", e);
    }
    if overruns > 0 {
        log::warn!("{} receives reported an overrun", overruns);
    }
    result
}
