// Copyright 2025-2026 CEMAXECUTER LLC

/// `n` evenly spaced values from `start` to `stop`, both inclusive.
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            (0..n).map(|i| start + i as f64 * step).collect()
        }
    }
}

/// One tuning step of a TX/RX sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepPoint {
    pub tx_freq: u64,
    /// Receiver tuned below the transmitter to keep the tone off the RX DC spike
    pub rx_freq: u64,
}

/// A linear frequency sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepPlan {
    pub start: f64,
    pub stop: f64,
    pub steps: usize,
    pub rx_offset: f64,
}

impl SweepPlan {
    pub fn points(&self) -> Vec<SweepPoint> {
        linspace(self.start, self.stop, self.steps)
            .into_iter()
            .map(|f| SweepPoint {
                tx_freq: f.round() as u64,
                rx_freq: (f - self.rx_offset).round().max(0.0) as u64,
            })
            .collect()
    }
}

/// Shift values so the maximum reads 0 dB.
pub fn normalize(values: &[f32]) -> Vec<f32> {
    let max = values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(f32::NEG_INFINITY, f32::max);
    if !max.is_finite() {
        return values.to_vec();
    }
    values.iter().map(|v| v - max).collect()
}
