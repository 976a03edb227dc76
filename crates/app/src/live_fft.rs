// Copyright 2025-2026 CEMAXECUTER LLC

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Args;
use crossbeam::channel::{self, Receiver};

use brf_dsp::Window;
use brf_sdr::file::{FileFormat, FileSource};
use brf_sdr::samples::to_complex;
use brf_sdr::{SampleBuf, SdrSource};

use crate::display::SpectrumView;
use crate::units::{parse_hz, parse_hz_u32};

#[derive(Args, Debug)]
pub struct LiveFftArgs {
    /// Device identifier; empty opens the first device
    #[arg(short = 'd', long, default_value = "")]
    pub device: String,

    /// Center frequency in Hz
    #[arg(short = 'c', long, default_value = "440M", value_parser = parse_hz)]
    pub frequency: u64,

    #[arg(short = 'b', long, default_value = "28M", value_parser = parse_hz_u32)]
    pub bandwidth: u32,

    #[arg(short = 's', long, default_value = "40M", value_parser = parse_hz_u32)]
    pub sample_rate: u32,

    #[arg(long, default_value_t = 16)]
    pub num_buffers: usize,

    #[arg(long, default_value_t = 16)]
    pub num_transfers: usize,

    /// Samples per buffer, also the FFT size
    #[arg(
        short = 'l',
        long,
        default_value_t = 65536,
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub num_samples: usize,

    /// Number of spectra in the rolling average
    #[arg(short = 'a', long, default_value_t = 10)]
    pub averaging: usize,

    /// FFT window: rect, hann, kaiser[:beta]
    #[arg(long, default_value = "hann")]
    pub window: Window,

    /// Play an IQ recording instead of streaming from hardware
    #[arg(short = 'f', long)]
    pub file: Option<PathBuf>,

    /// Sample format for file input: sc16, ci8, cf32
    #[arg(long, default_value = "sc16")]
    pub format: FileFormat,

    /// Loop the file
    #[arg(long)]
    pub repeat: bool,

    /// Stop after this many seconds
    #[arg(long)]
    pub duration: Option<f64>,

    /// Minimum time between redraws in milliseconds
    #[arg(long, default_value_t = 200)]
    pub refresh_ms: u64,

    #[arg(long, default_value_t = 100)]
    pub width: usize,

    #[arg(long, default_value_t = 24)]
    pub height: usize,
}

pub fn run(args: &LiveFftArgs) -> Result<(), String> {
    match args.file {
        Some(ref path) => {
            let mut source = FileSource::new(path, args.format, args.sample_rate, args.frequency);
            source.set_block_size(args.num_samples);
            source.set_repeat(args.repeat);
            let running = source.running_flag();
            run_display(args, Box::new(source), running, None)
        }
        None => run_hardware(args),
    }
}

#[cfg(feature = "bladerf")]
fn run_hardware(args: &LiveFftArgs) -> Result<(), String> {
    use brf_sdr::bladerf::{BladerfSource, RxSettings};
    use brf_sdr::{Format, StreamConfig};

    let settings = RxSettings {
        identifier: args.device.clone(),
        frequency: args.frequency,
        bandwidth: args.bandwidth,
        sample_rate: args.sample_rate,
        lna_gain: None,
        vga1: None,
        vga2: None,
    };
    let stream = StreamConfig {
        format: Format::Sc16Q11,
        num_buffers: args.num_buffers,
        samples_per_buffer: args.num_samples,
        num_transfers: args.num_transfers,
    };
    let source = BladerfSource::new(settings, stream);
    let running = source.running_flag();
    let overruns = source.overrun_counter();
    run_display(args, Box::new(source), running, Some(overruns))
}

#[cfg(not(feature = "bladerf"))]
fn run_hardware(_args: &LiveFftArgs) -> Result<(), String> {
    Err(crate::no_hardware("live-fft"))
}

/// Run `source` on its own thread and draw the averaged spectrum until it ends.
fn run_display(
    args: &LiveFftArgs,
    mut source: Box<dyn SdrSource>,
    running: Arc<AtomicBool>,
    overruns: Option<Arc<AtomicU64>>,
) -> Result<(), String> {
    let mut view = SpectrumView::new(
        args.num_samples,
        args.window,
        args.averaging,
        source.center_frequency(),
        source.sample_rate(),
        format!(
            "{:.3} MHz, {} MS/s, avg {}",
            source.center_frequency() as f64 / 1e6,
            f64::from(source.sample_rate()) / 1e6,
            args.averaging
        ),
    );
    view.set_size(args.width, args.height);

    // Queue depth matches the driver's buffer count; a full queue drops
    let (tx, rx) = channel::bounded::<SampleBuf>(args.num_buffers.max(1));
    let reader = std::thread::spawn(move || {
        if let Err(e) = source.start(tx) {
            log::error!("source error: {}", e);
        }
    });

    let deadline = args
        .duration
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
        .map(|d| Instant::now() + d);
    let result = consume(&rx, &mut view, args, deadline, overruns.as_deref());

    running.store(false, Ordering::SeqCst);
    // Unblock a producer waiting on a full queue
    drop(rx);
    if reader.join().is_err() {
        log::error!("source thread panicked");
    }
    if view.rejected() > 0 {
        log::info!("{} non-finite frames skipped", view.rejected());
    }
    result
}

fn consume(
    rx: &Receiver<SampleBuf>,
    view: &mut SpectrumView,
    args: &LiveFftArgs,
    deadline: Option<Instant>,
    overruns: Option<&AtomicU64>,
) -> Result<(), String> {
    let refresh = Duration::from_millis(args.refresh_ms);
    let mut last_draw: Option<Instant> = None;
    let mut frames: u64 = 0;

    for buf in rx.iter() {
        let n = buf.num_samples.min(args.num_samples);
        view.push(&to_complex(&buf.data, n));
        frames += 1;

        if last_draw.map_or(true, |t| t.elapsed() >= refresh) {
            let status = match overruns {
                Some(count) => format!(
                    "frames {}  overruns {}",
                    frames,
                    count.load(Ordering::Relaxed)
                ),
                None => format!("frames {}", frames),
            };
            view.draw(&status).map_err(|e| format!("display error: {}", e))?;
            last_draw = Some(Instant::now());
        }

        if deadline.map_or(false, |d| Instant::now() >= d) {
            break;
        }
    }

    view.draw(&format!("frames {}", frames))
        .map_err(|e| format!("display error: {}", e))
}
