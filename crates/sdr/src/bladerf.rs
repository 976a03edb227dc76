// Copyright 2025-2026 CEMAXECUTER LLC

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam::channel::{Sender, TrySendError};

use crate::config::StreamConfig;
use crate::device::Device;
use crate::error::Result;
use crate::metadata::Metadata;
use crate::ring::Disposition;
use crate::types::LnaGain;
use crate::{SampleBuf, SdrSource};

/// RX front-end settings applied before streaming starts.
#[derive(Debug, Clone)]
pub struct RxSettings {
    /// Device identifier; empty opens the first device
    pub identifier: String,
    pub frequency: u64,
    pub bandwidth: u32,
    pub sample_rate: u32,
    pub lna_gain: Option<LnaGain>,
    pub vga1: Option<i32>,
    pub vga2: Option<i32>,
}

/// Live bladeRF receiver feeding an asynchronous stream into a channel.
///
/// Completed buffers are copied out with `try_send`. When the consumer falls
/// behind, buffers are dropped and counted; the stream never blocks on it.
pub struct BladerfSource {
    settings: RxSettings,
    stream: StreamConfig,
    running: Arc<AtomicBool>,
    overruns: Arc<AtomicU64>,
}

impl BladerfSource {
    pub fn new(settings: RxSettings, stream: StreamConfig) -> Self {
        Self {
            settings,
            stream,
            running: Arc::new(AtomicBool::new(false)),
            overruns: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn running_flag(&self) -> Arc<AtomicBool> {
        self.running.clone()
    }

    /// Shared count of buffers dropped because the queue was full.
    pub fn overrun_counter(&self) -> Arc<AtomicU64> {
        self.overruns.clone()
    }

    fn configure(&self, dev: &Device) -> Result<()> {
        let s = &self.settings;
        let rx = dev.rx();
        rx.set_enabled(true)?;
        rx.set_frequency(s.frequency)?;
        let bw = rx.set_bandwidth(s.bandwidth)?;
        let rate = rx.set_sample_rate(s.sample_rate)?;
        if let Some(gain) = s.lna_gain {
            dev.set_lna_gain(gain)?;
        }
        if let Some(gain) = s.vga1 {
            rx.set_vga1(gain)?;
        }
        if let Some(gain) = s.vga2 {
            rx.set_vga2(gain)?;
        }

        log::info!(
            "bladeRF RX configured ({} Hz, bw {} Hz, {} S/s)",
            s.frequency,
            bw,
            rate,
        );
        Ok(())
    }
}

impl SdrSource for BladerfSource {
    fn start(&mut self, tx: Sender<SampleBuf>) -> Result<()> {
        self.running.store(true, Ordering::SeqCst);

        let dev = Device::open(&self.settings.identifier)?;
        self.configure(&dev)?;

        let running = self.running.clone();
        let overruns = self.overruns.clone();
        let handler = move |meta: &Metadata, samples: &mut [i16]| -> Disposition {
            if !running.load(Ordering::SeqCst) {
                return Disposition::Shutdown;
            }
            let buf = SampleBuf {
                data: samples.to_vec(),
                num_samples: samples.len() / 2,
                timestamp: (meta.timestamp != 0).then_some(meta.timestamp),
            };
            match tx.try_send(buf) {
                Ok(()) => Disposition::Advance,
                Err(TrySendError::Full(_)) => {
                    overruns.fetch_add(1, Ordering::Relaxed);
                    Disposition::Advance
                }
                Err(TrySendError::Disconnected(_)) => Disposition::Shutdown,
            }
        };

        let mut stream = dev.rx().stream(handler, &self.stream)?;
        log::info!(
            "bladeRF streaming ({} buffers x {} samples, {} transfers)",
            self.stream.num_buffers,
            self.stream.samples_per_buffer,
            self.stream.num_transfers,
        );
        let result = stream.run();
        drop(stream);

        if let Err(e) = dev.rx().set_enabled(false) {
            log::warn!("failed to disable RX: {}", e);
        }
        self.running.store(false, Ordering::SeqCst);

        let dropped = self.overruns.load(Ordering::Relaxed);
        if dropped > 0 {
            log::warn!("bladeRF: {} buffers dropped on a full queue", dropped);
        }
        log::info!("bladeRF streaming stopped");
        result
    }

    fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
    }

    fn sample_rate(&self) -> u32 {
        self.settings.sample_rate
    }

    fn center_frequency(&self) -> u64 {
        self.settings.frequency
    }
}
