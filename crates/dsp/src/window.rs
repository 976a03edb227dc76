// Copyright 2025-2026 CEMAXECUTER LLC

use std::f64::consts::PI;

/// Modified Bessel function of the first kind, order 0 (for Kaiser window)
fn bessel_i0(x: f64) -> f64 {
    let mut sum = 1.0;
    let mut term = 1.0;
    let x_sq_over_4 = x * x / 4.0;
    for k in 1..=30 {
        term *= x_sq_over_4 / (k * k) as f64;
        sum += term;
        if term < sum * 1e-12 {
            break;
        }
    }
    sum
}

/// Generate Kaiser window coefficients
///
/// - `n`: window length
/// - `beta`: shape parameter (higher = narrower mainlobe, lower sidelobes)
pub fn kaiser(n: usize, beta: f64) -> Vec<f64> {
    if n == 1 {
        return vec![1.0];
    }
    let denom = bessel_i0(beta);
    (0..n)
        .map(|i| {
            let x = 2.0 * i as f64 / (n as f64 - 1.0) - 1.0;
            bessel_i0(beta * (1.0 - x * x).max(0.0).sqrt()) / denom
        })
        .collect()
}

/// Periodic Hann window, the usual choice for FFT frames.
pub fn hann(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f64 / n as f64).cos())
        .collect()
}

/// Spectral window applied before the FFT.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Window {
    Rectangular,
    Hann,
    Kaiser { beta: f64 },
}

impl Default for Window {
    fn default() -> Self {
        Window::Hann
    }
}

impl Window {
    pub fn coefficients(&self, n: usize) -> Vec<f32> {
        let w = match *self {
            Window::Rectangular => vec![1.0; n],
            Window::Hann => hann(n),
            Window::Kaiser { beta } => kaiser(n, beta),
        };
        w.into_iter().map(|v| v as f32).collect()
    }
}

impl std::str::FromStr for Window {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, String> {
        let lower = s.to_ascii_lowercase();
        match lower.as_str() {
            "rect" | "rectangular" | "none" => Ok(Window::Rectangular),
            "hann" | "hanning" => Ok(Window::Hann),
            "kaiser" => Ok(Window::Kaiser { beta: 7.0 }),
            _ => match lower.strip_prefix("kaiser:") {
                Some(beta) => beta
                    .parse()
                    .map(|beta| Window::Kaiser { beta })
                    .map_err(|e| format!("bad kaiser beta '{}': {}", beta, e)),
                None => Err(format!("unknown window '{}' (use rect, hann, kaiser[:beta])", s)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kaiser_window() {
        let w = kaiser(64, 7.0);
        assert_eq!(w.len(), 64);
        // Should be symmetric
        for i in 0..32 {
            assert!(
                (w[i] - w[63 - i]).abs() < 1e-10,
                "asymmetry at index {}: {} != {}",
                i,
                w[i],
                w[63 - i]
            );
        }
        // Peak at center
        assert!(w[31] > 0.99);
        // Edges should be small
        assert!(w[0] < 0.1);
    }

    #[test]
    fn test_hann_window() {
        let w = hann(8);
        assert_eq!(w[0], 0.0);
        assert!((w[4] - 1.0).abs() < 1e-12);
        // Periodic: w[i] == w[n - i]
        assert!((w[1] - w[7]).abs() < 1e-12);
        // Coherent gain of a periodic Hann window is exactly 1/2
        let sum: f64 = hann(1024).iter().sum();
        assert!((sum / 1024.0 - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_window_names() {
        assert_eq!("hann".parse::<Window>(), Ok(Window::Hann));
        assert_eq!("kaiser:5".parse::<Window>(), Ok(Window::Kaiser { beta: 5.0 }));
        assert_eq!("RECT".parse::<Window>(), Ok(Window::Rectangular));
        assert!("blackman".parse::<Window>().is_err());
        assert_eq!(Window::Rectangular.coefficients(3), vec![1.0; 3]);
    }
}
