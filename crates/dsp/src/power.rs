// Copyright 2025-2026 CEMAXECUTER LLC

use num_complex::Complex32;

/// Full scale of SC16 Q11 samples.
const Q11_SCALE: f64 = 2048.0;

/// Mean |x|^2 of interleaved SC16 Q11 I/Q, normalized to full scale.
pub fn mean_power_iq(samples: &[i16]) -> f64 {
    let pairs = samples.len() / 2;
    if pairs == 0 {
        return 0.0;
    }
    let total: f64 = samples
        .chunks_exact(2)
        .map(|iq| {
            let i = f64::from(iq[0]) / Q11_SCALE;
            let q = f64::from(iq[1]) / Q11_SCALE;
            i * i + q * q
        })
        .sum();
    total / pairs as f64
}

/// Mean |x|^2 of complex samples.
pub fn mean_power(samples: &[Complex32]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().map(|s| f64::from(s.norm_sqr())).sum::<f64>() / samples.len() as f64
}

/// Linear power to dBFS; zero power maps to negative infinity.
pub fn power_dbfs(power: f64) -> f64 {
    10.0 * power.log10()
}

/// True when the buffer is quieter than `threshold_db` dBFS.
///
/// A threshold of 0 dB or above disables the squelch: nothing is
/// squelched, matching a recorder default of "off".
pub fn squelched(samples: &[Complex32], threshold_db: f64) -> bool {
    if threshold_db >= 0.0 {
        return false;
    }
    power_dbfs(mean_power(samples)) < threshold_db
}

/// Index and value of the largest element.
pub fn peak(values: &[f32]) -> Option<(usize, f32)> {
    values
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, v)| !v.is_nan())
        .fold(None, |best, (i, v)| match best {
            Some((_, b)) if b >= v => best,
            _ => Some((i, v)),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_power_iq() {
        // Full-scale I, zero Q -> 1.0
        assert!((mean_power_iq(&[-2048, 0, -2048, 0]) - 1.0).abs() < 1e-12);
        // Half scale on both rails -> 0.25 + 0.25
        assert!((mean_power_iq(&[1024, 1024]) - 0.5).abs() < 1e-12);
        assert_eq!(mean_power_iq(&[]), 0.0);
    }

    #[test]
    fn test_squelch() {
        let quiet = vec![Complex32::new(0.001, 0.0); 64]; // -60 dBFS
        let loud = vec![Complex32::new(0.5, 0.0); 64]; // about -6 dBFS
        assert!(squelched(&quiet, -40.0));
        assert!(!squelched(&loud, -40.0));
        // Disabled
        assert!(!squelched(&quiet, 0.0));
        // Silence is always below an enabled squelch
        assert!(squelched(&[Complex32::new(0.0, 0.0); 4], -120.0));
    }

    #[test]
    fn test_peak() {
        assert_eq!(peak(&[-3.0, 2.0, f32::NAN, 1.0]), Some((1, 2.0)));
        // First maximum wins ties
        assert_eq!(peak(&[5.0, 5.0]), Some((0, 5.0)));
        assert_eq!(peak(&[]), None);
    }
}
