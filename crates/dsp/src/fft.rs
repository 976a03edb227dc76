// Copyright 2025-2026 CEMAXECUTER LLC

use num_complex::Complex32;
use rustfft::{Fft, FftPlanner};
use std::sync::Arc;

use crate::window::Window;

/// Floor applied before the log so empty bins stay finite.
const POWER_FLOOR: f32 = 1e-20;

/// Windowed forward FFT producing a centered power spectrum in dBFS.
///
/// Power is normalized by the window's coherent gain, so a full-scale
/// complex tone (|x| = 1.0) that lands on a bin reads 0 dBFS.
pub struct SpectrumAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    size: usize,
    window: Vec<f32>,
    norm: f32,
    buffer: Vec<Complex32>,
    scratch: Vec<Complex32>,
}

impl SpectrumAnalyzer {
    pub fn new(size: usize, window: Window) -> Self {
        assert!(size > 0, "FFT size must be nonzero");
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);
        let scratch_len = fft.get_inplace_scratch_len();
        let window = window.coefficients(size);
        let gain: f32 = window.iter().sum();
        Self {
            fft,
            size,
            norm: 1.0 / (gain * gain),
            window,
            buffer: vec![Complex32::new(0.0, 0.0); size],
            scratch: vec![Complex32::new(0.0, 0.0); scratch_len],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Power spectrum of `samples` in dBFS, DC in the middle (bin `size / 2`).
    ///
    /// Shorter input is zero-padded; longer input is truncated.
    pub fn power_db(&mut self, samples: &[Complex32]) -> Vec<f32> {
        for (i, slot) in self.buffer.iter_mut().enumerate() {
            *slot = samples.get(i).map_or(Complex32::new(0.0, 0.0), |s| *s * self.window[i]);
        }
        self.fft.process_with_scratch(&mut self.buffer, &mut self.scratch);

        let half = self.size / 2;
        (0..self.size)
            .map(|k| {
                // fftshift: output bin k holds FFT bin (k + size - half) mod size
                let bin = (k + self.size - half) % self.size;
                let p = self.buffer[bin].norm_sqr() * self.norm;
                10.0 * p.max(POWER_FLOOR).log10()
            })
            .collect()
    }
}

/// Center frequency of each shifted bin for an `n`-point spectrum.
pub fn frequency_axis(center_hz: f64, sample_rate: f64, n: usize) -> Vec<f64> {
    let step = sample_rate / n as f64;
    let start = center_hz - sample_rate / 2.0;
    (0..n).map(|k| start + k as f64 * step).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn tone(size: usize, bin: i32) -> Vec<Complex32> {
        (0..size)
            .map(|n| {
                let phase = 2.0 * PI * bin as f32 * n as f32 / size as f32;
                Complex32::new(phase.cos(), phase.sin())
            })
            .collect()
    }

    fn peak_bin(spec: &[f32]) -> usize {
        spec.iter()
            .enumerate()
            .fold((0, f32::MIN), |best, (i, &v)| if v > best.1 { (i, v) } else { best })
            .0
    }

    #[test]
    fn test_dc_lands_in_center() {
        let size = 64;
        let mut sa = SpectrumAnalyzer::new(size, Window::Rectangular);
        let spec = sa.power_db(&vec![Complex32::new(1.0, 0.0); size]);
        assert_eq!(spec.len(), size);
        assert_eq!(peak_bin(&spec), size / 2);
        // Full-scale DC reads 0 dBFS
        assert!(spec[size / 2].abs() < 0.01, "got {}", spec[size / 2]);
        // Other bins are at the floor
        assert!(spec[0] < -100.0);
    }

    #[test]
    fn test_positive_and_negative_tones() {
        let size = 128;
        let mut sa = SpectrumAnalyzer::new(size, Window::Hann);

        let spec = sa.power_db(&tone(size, 10));
        assert_eq!(peak_bin(&spec), size / 2 + 10);
        assert!(spec[size / 2 + 10].abs() < 0.01);

        let spec = sa.power_db(&tone(size, -20));
        assert_eq!(peak_bin(&spec), size / 2 - 20);
    }

    #[test]
    fn test_short_input_is_zero_padded() {
        let mut sa = SpectrumAnalyzer::new(32, Window::Rectangular);
        let spec = sa.power_db(&[Complex32::new(1.0, 0.0); 16]);
        assert_eq!(spec.len(), 32);
        assert!(spec.iter().all(|v| v.is_finite()));
        assert_eq!(peak_bin(&spec), 16);
    }

    #[test]
    fn test_frequency_axis() {
        let axis = frequency_axis(440e6, 40e6, 4);
        assert_eq!(axis, vec![420e6, 430e6, 440e6, 450e6]);
    }
}
