// Copyright 2025-2026 CEMAXECUTER LLC

use std::io::{self, Write};

use num_complex::Complex32;

use brf_dsp::{frequency_axis, SpectrumAnalyzer, SpectrumAverager, Window};
use brf_output::plot::{self, PlotOptions};

/// Averaged spectrum of a stream of sample blocks, drawn as a text plot.
pub struct SpectrumView {
    analyzer: SpectrumAnalyzer,
    averager: SpectrumAverager,
    freqs: Vec<f64>,
    opts: PlotOptions,
    rejected: u64,
}

impl SpectrumView {
    pub fn new(
        fft_size: usize,
        window: Window,
        averaging: usize,
        center_hz: u64,
        sample_rate: u32,
        title: String,
    ) -> Self {
        Self {
            analyzer: SpectrumAnalyzer::new(fft_size, window),
            averager: SpectrumAverager::new(averaging, fft_size),
            freqs: frequency_axis(center_hz as f64, f64::from(sample_rate), fft_size),
            opts: PlotOptions {
                title,
                ..Default::default()
            },
            rejected: 0,
        }
    }

    pub fn set_size(&mut self, width: usize, height: usize) {
        self.opts.width = width;
        self.opts.height = height;
    }

    /// Transform one block and fold it into the average.
    /// Returns false when the frame had non-finite values and was skipped.
    pub fn push(&mut self, samples: &[Complex32]) -> bool {
        let frame = self.analyzer.power_db(samples);
        if self.averager.push(frame) {
            true
        } else {
            self.rejected += 1;
            false
        }
    }

    /// Frames skipped so far
    pub fn rejected(&self) -> u64 {
        self.rejected
    }

    pub fn render(&self) -> Option<String> {
        let mean = self.averager.mean()?;
        let mut text = plot::render(&self.freqs, &mean, &self.opts);
        if let Some((bin, db)) = brf_dsp::power::peak(&mean) {
            text.push_str(&format!(
                "peak {:.1} dBFS at {:.4} MHz\n",
                db,
                self.freqs[bin] / 1e6
            ));
        }
        Some(text)
    }

    /// Redraw in place on a terminal, with `status` under the plot.
    pub fn draw(&self, status: &str) -> io::Result<()> {
        if let Some(text) = self.render() {
            let mut out = io::stdout().lock();
            // Home cursor and clear screen
            out.write_all(b"\x1b[H\x1b[2J")?;
            out.write_all(text.as_bytes())?;
            if !status.is_empty() {
                writeln!(out, "{}", status)?;
            }
            out.flush()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_after_first_frame() {
        let mut view = SpectrumView::new(64, Window::Hann, 4, 100_000_000, 1_000_000, "test".into());
        assert!(view.render().is_none());

        // DC tone shows up at the center frequency
        assert!(view.push(&vec![Complex32::new(0.5, 0.0); 64]));
        let text = view.render().unwrap();
        assert!(text.starts_with("test\n"));
        assert!(text.contains("at 100.0000 MHz"));
    }

    #[test]
    fn test_non_finite_frames_skipped() {
        let mut view = SpectrumView::new(16, Window::Rectangular, 2, 0, 16, String::new());
        let mut samples = vec![Complex32::new(0.1, 0.0); 16];
        samples[3] = Complex32::new(f32::NAN, 0.0);
        assert!(!view.push(&samples));
        assert_eq!(view.rejected(), 1);
        assert!(view.render().is_none());
    }
}
