// Copyright 2025-2026 CEMAXECUTER LLC

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use clap::Args;
use num_complex::Complex32;

use brf_dsp::sweep::{self, SweepPlan, SweepPoint};
use brf_dsp::{power, SpectrumAnalyzer, Window};
use brf_output::plot::{self, PlotOptions};
use brf_output::report::{self, SweepRecord};

use crate::units::{parse_hz, parse_hz_u32};

#[derive(Args, Debug)]
pub struct FreqResponseArgs {
    #[arg(short = 'd', long, default_value = "")]
    pub device: String,

    #[arg(long, default_value = "430M", value_parser = parse_hz)]
    pub start: u64,

    #[arg(long, default_value = "450M", value_parser = parse_hz)]
    pub stop: u64,

    #[arg(long, default_value_t = 100)]
    pub steps: usize,

    /// RX tuning offset below TX, keeps the tone off the RX DC spike
    #[arg(long, default_value = "0.1M", value_parser = parse_hz)]
    pub rx_offset: u64,

    #[arg(short = 'b', long, default_value = "1.5M", value_parser = parse_hz_u32)]
    pub bandwidth: u32,

    #[arg(short = 's', long, default_value = "4M", value_parser = parse_hz_u32)]
    pub sample_rate: u32,

    #[arg(long, default_value_t = 20)]
    pub rx_vga1: i32,

    #[arg(long, default_value_t = 5)]
    pub rx_vga2: i32,

    #[arg(long, default_value_t = 24)]
    pub num_buffers: u32,

    #[arg(long, default_value_t = 8)]
    pub num_transfers: u32,

    /// Samples per burst
    #[arg(
        long,
        default_value_t = 1 << 14,
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(2..)
    )]
    pub num_samples: usize,

    #[arg(long, default_value_t = 3500)]
    pub timeout_ms: u32,

    #[arg(long, default_value = "rect")]
    pub window: Window,

    /// Write the sweep as CSV
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Write the sweep as JSON
    #[arg(long)]
    pub json: Option<PathBuf>,
}

impl FreqResponseArgs {
    pub fn plan(&self) -> SweepPlan {
        SweepPlan {
            start: self.start as f64,
            stop: self.stop as f64,
            steps: self.steps,
            rx_offset: self.rx_offset as f64,
        }
    }
}

/// Peak bin power of the first half of a received burst.
///
/// The tail of a scheduled receive can run past the end of the burst, so only
/// the first half is analysed.
pub fn burst_peak(analyzer: &mut SpectrumAnalyzer, samples: &[Complex32]) -> Option<f32> {
    let half = &samples[..samples.len() / 2];
    if half.is_empty() {
        return None;
    }
    let spectrum = analyzer.power_db(half);
    power::peak(&spectrum).map(|(_, db)| db)
}

/// Pair sweep points with their measured power. Missing or non-finite
/// measurements stay `None` and do not affect normalization.
pub fn build_records(points: &[SweepPoint], powers: &[Option<f32>]) -> Vec<SweepRecord> {
    let powers: Vec<Option<f32>> = powers.iter().map(|p| p.filter(|db| db.is_finite())).collect();
    let raw: Vec<f32> = powers.iter().map(|p| p.unwrap_or(f32::NEG_INFINITY)).collect();
    let normalized = sweep::normalize(&raw);
    points
        .iter()
        .zip(&powers)
        .zip(normalized)
        .map(|((p, &db), norm)| SweepRecord {
            frequency_hz: p.tx_freq,
            power_db: db,
            normalized_db: db.map(|_| norm),
        })
        .collect()
}

pub fn render(records: &[SweepRecord]) -> String {
    let xs: Vec<f64> = records.iter().map(|r| r.frequency_hz as f64).collect();
    let ys: Vec<f32> = records.iter().map(|r| r.normalized_db.unwrap_or(f32::NAN)).collect();
    let opts = PlotOptions {
        width: records.len().clamp(1, 100),
        height: 20,
        title: "Normalised power (dB)".to_string(),
        ..Default::default()
    };
    plot::render(&xs, &ys, &opts)
}

fn write_reports(args: &FreqResponseArgs, records: &[SweepRecord]) -> Result<(), String> {
    fn create(path: &Path) -> Result<BufWriter<File>, String> {
        File::create(path)
            .map(BufWriter::new)
            .map_err(|e| format!("failed to create {}: {}", path.display(), e))
    }
    if let Some(ref path) = args.csv {
        report::write_csv(create(path)?, records)
            .map_err(|e| format!("failed to write {}: {}", path.display(), e))?;
        log::info!("wrote {}", path.display());
    }
    if let Some(ref path) = args.json {
        report::write_json(create(path)?, records)
            .map_err(|e| format!("failed to write {}: {}", path.display(), e))?;
        log::info!("wrote {}", path.display());
    }
    Ok(())
}

#[cfg(feature = "bladerf")]
pub fn run(args: &FreqResponseArgs) -> Result<(), String> {
    use brf_sdr::Device;

    let dev = Device::open(&args.device).map_err(|e| format!("failed to open device: {}", e))?;
    let result = hardware::sweep(&dev, args);

    // Both modules stay off afterwards, otherwise the carrier keeps going
    for ch in [dev.tx(), dev.rx()] {
        if let Err(e) = ch.set_enabled(false) {
            log::warn!("failed to disable {}: {}", ch.module(), e);
        }
    }

    let powers = result.map_err(|e| format!("sweep failed: {}", e))?;
    let points = args.plan().points();
    let records = build_records(&points, &powers);
    print!("{}", render(&records));
    write_reports(args, &records)
}

#[cfg(feature = "bladerf")]
mod hardware {
    use std::time::Duration;

    use brf_sdr::burst::{BurstPlan, DEFAULT_LEAD_DIVISOR};
    use brf_sdr::samples::{self, SC16_Q11_MAX};
    use brf_sdr::{Channel, Device, Format, Result, SyncConfig};

    use super::*;

    pub fn sweep(dev: &Device, args: &FreqResponseArgs) -> Result<Vec<Option<f32>>> {
        let (tx, rx) = (dev.tx(), dev.rx());
        let plan = args.plan();
        let first = plan.points().first().copied().unwrap_or(SweepPoint {
            tx_freq: args.start,
            rx_freq: args.start.saturating_sub(args.rx_offset),
        });

        tx.set_frequency(first.tx_freq)?;
        tx.set_bandwidth(args.bandwidth)?;
        let rate = tx.set_sample_rate(args.sample_rate)?;
        rx.set_frequency(first.rx_freq)?;
        rx.set_bandwidth(args.bandwidth)?;
        rx.set_sample_rate(args.sample_rate)?;
        rx.set_vga1(args.rx_vga1)?;
        rx.set_vga2(args.rx_vga2)?;

        // Timestamp counters start running here
        tx.set_enabled(true)?;
        rx.set_enabled(true)?;

        let sync = SyncConfig {
            format: Format::Sc16Q11Meta,
            num_buffers: args.num_buffers,
            buffer_size: 4 * args.num_samples as u32,
            num_transfers: args.num_transfers,
            timeout_ms: args.timeout_ms,
        };
        tx.configure_sync(&sync)?;
        rx.configure_sync(&sync)?;

        // Full-scale DC, which leaves the TX as a strong LO carrier
        let carrier = samples::constant(args.num_samples, SC16_Q11_MAX, SC16_Q11_MAX);
        let mut buf = vec![0i16; args.num_samples * 2];
        let mut analyzer = SpectrumAnalyzer::new((args.num_samples / 2).max(1), args.window);
        let mut powers = Vec::with_capacity(plan.steps);

        for point in plan.points() {
            log::info!("frequency {} Hz", point.tx_freq);
            let count = burst(&tx, &rx, point, rate, &carrier, &mut buf, args)?;
            let received = samples::to_complex(&buf, count);
            let db = burst_peak(&mut analyzer, &received);
            match db {
                Some(db) => log::info!("power {:.2} dB", db),
                None => log::warn!("no samples received at {} Hz", point.rx_freq),
            }
            powers.push(db);
        }
        Ok(powers)
    }

    /// One scheduled TX/RX burst. Returns the received sample count.
    fn burst(
        tx: &Channel<'_>,
        rx: &Channel<'_>,
        point: SweepPoint,
        rate: u32,
        carrier: &[i16],
        buf: &mut [i16],
        args: &FreqResponseArgs,
    ) -> Result<usize> {
        tx.set_frequency(point.tx_freq)?;
        rx.set_frequency(point.rx_freq)?;

        let tx_now = tx.timestamp()?;
        let rx_now = rx.timestamp()?;
        log::debug!("timestamps: TX {}, RX {}", tx_now, rx_now);
        let plan = BurstPlan::new(tx_now, rx_now, rate, DEFAULT_LEAD_DIVISOR, args.num_samples);

        let mut tx_meta = plan.tx_metadata();
        tx.transmit(carrier, Some(&mut tx_meta), args.timeout_ms)?;
        let mut rx_meta = plan.rx_metadata();
        rx.receive(buf, Some(&mut rx_meta), args.timeout_ms)?;

        while !plan.tx_drained(tx.timestamp()?) {
            std::thread::sleep(Duration::from_micros(500));
        }

        log::debug!("received {} samples", rx_meta.actual_count);
        Ok((rx_meta.actual_count as usize).min(args.num_samples))
    }
}
